//! Integration tests for the concurrency gate
//!
//! Tests cover:
//! - At most `max_concurrency` variants in flight
//! - Queued variants start only after a slot frees up
//! - Gate behavior across spawned tasks on a multi-threaded runtime
//! - One gate shared by concurrent requests

use super::test_utils::{providers, sample_content, EchoPrompts, InstrumentedImages};
use coverforge::concurrency::ConcurrencyGate;
use coverforge::generation::{GenerationSettings, VariantOrchestrator};
use coverforge::style::{StyleConfig, StyleParams, PHOTOREALISTIC};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const VISUAL_STYLES: [&str; 5] = ["ink", "watercolor", "charcoal", "pixel", "collage"];

fn five_styles() -> Vec<StyleConfig> {
    let ids = ["s1", "s2", "s3", "s4", "s5"];
    ids.into_iter()
        .zip(VISUAL_STYLES)
        .map(|(id, visual_style)| StyleConfig {
            id,
            label: id,
            params: StyleParams {
                visual_style,
                ..PHOTOREALISTIC.params
            },
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_five_tasks_with_three_permits() {
    let prompts = Arc::new(EchoPrompts::default());
    let images = Arc::new(InstrumentedImages::new(Duration::from_millis(500)));
    let settings = GenerationSettings {
        max_concurrency: 3,
        ..GenerationSettings::default()
    };
    let orchestrator =
        VariantOrchestrator::new(providers(prompts, images.clone(), None), settings)
            .with_styles(five_styles());

    let response = orchestrator.generate(&sample_content()).await.unwrap();

    assert_eq!(response.variants.len(), 5);
    assert_eq!(response.metadata.success_count, 5);
    assert_eq!(images.max_in_flight(), 3);

    let first_finish = VISUAL_STYLES[..3]
        .iter()
        .map(|prompt| images.span(prompt).finished)
        .min()
        .unwrap();
    for queued in &VISUAL_STYLES[3..] {
        let span = images.span(queued);
        assert!(
            span.started >= first_finish,
            "{} started before any of the first three finished",
            queued
        );
    }
    // Two waves of 500ms each.
    assert!((1000..1010).contains(&response.metadata.total_generation_time));
}

#[tokio::test(start_paused = true)]
async fn test_single_permit_serializes_variants() {
    let prompts = Arc::new(EchoPrompts::default());
    let images = Arc::new(InstrumentedImages::new(Duration::from_millis(200)));
    let settings = GenerationSettings {
        max_concurrency: 1,
        ..GenerationSettings::default()
    };
    let orchestrator =
        VariantOrchestrator::new(providers(prompts, images.clone(), None), settings)
            .with_styles(five_styles());

    let response = orchestrator.generate(&sample_content()).await.unwrap();

    assert_eq!(images.max_in_flight(), 1);
    assert!((1000..1010).contains(&response.metadata.total_generation_time));
    // FIFO: variants start in submission order.
    let starts: Vec<_> = VISUAL_STYLES
        .iter()
        .map(|prompt| images.span(prompt).started)
        .collect();
    assert!(starts.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_gate_bounds_spawned_tasks() {
    let gate = Arc::new(ConcurrencyGate::new(3));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let gate = Arc::clone(&gate);
            let in_flight = Arc::clone(&in_flight);
            let max_in_flight = Arc::clone(&max_in_flight);
            tokio::spawn(async move {
                let permit = gate.acquire().await.unwrap();
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                permit.release();
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert!(max_in_flight.load(Ordering::SeqCst) <= 3);
    assert_eq!(gate.available(), 3);
    assert_eq!(gate.waiting(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fresh_gate_per_request() {
    let prompts = Arc::new(EchoPrompts::default());
    let images = Arc::new(InstrumentedImages::new(Duration::from_millis(100)));
    let orchestrator = VariantOrchestrator::new(
        providers(prompts, images.clone(), None),
        GenerationSettings::default(),
    )
    .with_styles(five_styles());

    let content = sample_content();
    let (first, second) = tokio::join!(
        orchestrator.generate(&content),
        orchestrator.generate(&content)
    );

    // Each request has its own three slots, so both finish in two waves.
    assert!((200..210).contains(&first.unwrap().metadata.total_generation_time));
    assert!((200..210).contains(&second.unwrap().metadata.total_generation_time));
    assert_eq!(images.max_in_flight(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_shared_gate_bounds_concurrent_requests() {
    let prompts = Arc::new(EchoPrompts::default());
    let images = Arc::new(InstrumentedImages::new(Duration::from_millis(100)));
    let orchestrator = VariantOrchestrator::new(
        providers(prompts, images.clone(), None),
        GenerationSettings::default(),
    )
    .with_styles(five_styles());
    let gate = Arc::new(ConcurrencyGate::new(3));

    let content = sample_content();
    let (first, second) = tokio::join!(
        orchestrator.generate_with_gate(&content, Arc::clone(&gate)),
        orchestrator.generate_with_gate(&content, Arc::clone(&gate))
    );

    let first = first.unwrap();
    let second = second.unwrap();
    assert_eq!(first.metadata.success_count, 5);
    assert_eq!(second.metadata.success_count, 5);
    // Ten variants share three slots.
    assert_eq!(images.max_in_flight(), 3);
    let slowest = first
        .metadata
        .total_generation_time
        .max(second.metadata.total_generation_time);
    assert!((400..410).contains(&slowest));
    assert_eq!(gate.available(), 3);
    assert_eq!(gate.waiting(), 0);
}
