//! Demo binary: builds an in-memory page, wires interaction triggers to the
//! animator, and drives the frame queue with a hand-cranked clock, logging
//! the styles the engine writes.
//!
//! Run with `RUST_LOG=debug` to see the engine's internal tracing as well.

use anyhow::Result;
use tracing::info;

use motio_dom::{Document, Element, MemoryDocument, MemoryElement, ObserverOptions, Rect};
use motio_engine::{
    AnimateOptions, Animator, Clock, Easing, FrameQueue, ManualClock, PropertyMap, Target,
    triggers,
};

const FRAME_MS: f64 = 16.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let doc = MemoryDocument::new();
    let clock = ManualClock::new();
    let queue = FrameQueue::new();
    let animator = Animator::new(queue.clone());

    let (cta, cards) = build_page(&doc);

    // Click: pulse the button.
    {
        let animator = animator.clone();
        triggers::on_click(&doc, Target::selector(".cta"), move |el: &MemoryElement| {
            animator.animate(
                el,
                &PropertyMap::new().set("scale", "1.1"),
                AnimateOptions::default()
                    .with_duration(150.0)
                    .with_easing(Easing::OutQuad),
            );
        });
    }

    // Double-click: spin it around.
    {
        let animator = animator.clone();
        triggers::on_double_click(
            &doc,
            Target::selector(".cta"),
            clock.clone(),
            move |el: &MemoryElement| {
                animator.animate(
                    el,
                    &PropertyMap::new().set("rotate", "360"),
                    AnimateOptions::default().with_easing(Easing::InOutCubic),
                );
            },
        );
    }

    // Cards below the fold fade in as they scroll into view. Options come
    // from JSON the way a declarative caller would supply them.
    let reveal: AnimateOptions =
        serde_json::from_str(r#"{"duration_ms": 600, "easing": {"type": "out_cubic"}}"#)?;
    {
        let animator = animator.clone();
        triggers::on_enter_viewport(
            &doc,
            Target::selector(".card"),
            ObserverOptions::default(),
            move |el: &MemoryElement| {
                animator.animate(
                    el,
                    &PropertyMap::new().set("opacity", "1").set("translateY", "0"),
                    reveal,
                );
            },
        );
    }

    info!("click");
    doc.click(&cta);
    run_frames(&doc, &queue, &clock, 12);
    info!(transform = ?cta.inline_style("transform"), "cta after click");

    info!("double click");
    doc.click(&cta);
    clock.advance(100.0);
    doc.click(&cta);
    run_frames(&doc, &queue, &clock, 30);
    info!(transform = ?cta.inline_style("transform"), "cta after double click");

    info!("scroll to the cards");
    doc.set_viewport(Rect::new(0.0, 1600.0, 1280.0, 800.0));
    run_frames(&doc, &queue, &clock, 40);
    for (i, card) in cards.iter().enumerate() {
        info!(
            card = i,
            opacity = ?card.inline_style("opacity"),
            transform = ?card.inline_style("transform"),
            "card revealed"
        );
    }

    Ok(())
}

fn build_page(doc: &MemoryDocument) -> (MemoryElement, Vec<MemoryElement>) {
    let hero = doc.create_element("section");
    hero.add_class("hero");
    doc.append_child(&doc.root(), &hero);

    let cta = doc.create_element("button");
    cta.add_class("cta");
    cta.set_rect(Rect::new(100.0, 300.0, 200.0, 60.0));
    doc.append_child(&hero, &cta);

    let mut cards = Vec::new();
    for i in 0..3 {
        let card = doc.create_element("article");
        card.add_class("card");
        card.set_base_style("opacity", "0");
        card.set_base_style("transform", "translate3d(0px, 40px, 0px)");
        card.set_rect(Rect::new(100.0, 1800.0 + 300.0 * i as f64, 400.0, 240.0));
        doc.append_child(&doc.root(), &card);
        cards.push(card);
    }
    (cta, cards)
}

fn run_frames(doc: &MemoryDocument, queue: &FrameQueue, clock: &ManualClock, frames: usize) {
    for _ in 0..frames {
        clock.advance(FRAME_MS);
        queue.run_frame(clock.now_ms());
        // Rects do not move in this demo, but a real host would re-test
        // intersections as layout changes.
        doc.update_intersections();
    }
}
