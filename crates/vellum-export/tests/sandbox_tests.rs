//! Sandbox lifecycle and bounded-wait tests.
//!
//! Time is paused in every test, so the polling delays cost nothing and
//! elapsed times are exact up to timer granularity.

use std::cell::Cell;
use std::time::Duration;

use tokio::time::Instant;
use vellum_common::warning::was_warned;
use vellum_dom::DomTree;
use vellum_export::{
    DocumentHost, ExportConfig, ExportError, Exporter, HeadlessHost, HostDocument, Sandbox,
    Viewport,
};
use vellum_html::parse_document;

/// Counts lifecycle calls. Linked sheets never finish loading, and layout
/// optionally panics.
#[derive(Default)]
struct CountingHost {
    created: Cell<usize>,
    layouts: Cell<usize>,
    destroyed: Cell<usize>,
    panic_on_layout: bool,
}

impl CountingHost {
    fn panicking() -> Self {
        Self {
            panic_on_layout: true,
            ..Self::default()
        }
    }
}

impl DocumentHost for CountingHost {
    fn create(&self, html: &str, viewport: Viewport) -> Result<HostDocument, ExportError> {
        self.created.set(self.created.get() + 1);
        Ok(HostDocument::new(parse_document(html), viewport))
    }

    fn force_layout(&self, _document: &mut HostDocument) -> f32 {
        self.layouts.set(self.layouts.get() + 1);
        assert!(!self.panic_on_layout, "layout engine crashed");
        0.0
    }

    fn destroy(&self, document: &mut HostDocument) {
        self.destroyed.set(self.destroyed.get() + 1);
        document.tree = DomTree::new();
    }
}

const SLOW_SHEET: &str = r#"<link rel="stylesheet" href="slow.css"><div class="a">x</div>"#;

#[tokio::test(start_paused = true)]
async fn test_never_stylable_sandbox_times_out() {
    let exporter = Exporter::new(CountingHost::default());
    let start = Instant::now();
    let report = exporter.render_detailed(SLOW_SHEET, &[]).await;
    let elapsed = start.elapsed();

    assert!(!report.fell_back);
    assert!(!report.stylable);
    assert_eq!(report.poll_attempts, 50);
    assert_eq!(exporter.host().layouts.get(), 50);
    assert!(elapsed >= Duration::from_millis(2_450), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(2_600), "{elapsed:?}");
    assert!(report.html.contains(r#"<div class="a"><p"#));
    assert!(!report.html.contains("<link"));
    assert_eq!(exporter.host().destroyed.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_every_timeout_is_reported() {
    let config = ExportConfig {
        max_attempts: 2,
        ..ExportConfig::default()
    };
    let exporter = Exporter::new(CountingHost::default())
        .with_config(config)
        .unwrap();
    for _ in 0..3 {
        let report = exporter.render_detailed(SLOW_SHEET, &[]).await;
        assert!(!report.stylable);
        assert_eq!(report.poll_attempts, 2);
    }
    assert_eq!(exporter.host().layouts.get(), 6);
    // Timeouts bypass the deduplicated warning set.
    assert!(!was_warned(
        "export-sandbox",
        "style sheets not readable after 2 attempts; exporting anyway"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_wait_bound_follows_config() {
    let config = ExportConfig {
        max_attempts: 4,
        poll_interval_ms: 250,
        ..ExportConfig::default()
    };
    let exporter = Exporter::new(CountingHost::default())
        .with_config(config)
        .unwrap();
    let start = Instant::now();
    let report = exporter.render_detailed(SLOW_SHEET, &[]).await;

    assert_eq!(report.poll_attempts, 4);
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(750), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(800), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_sheet_arriving_late_is_used() {
    let host = HeadlessHost::new()
        .with_stylesheet("slow.css", ".a { color: red }")
        .with_load_delay(3);
    let report = Exporter::new(host).render_detailed(SLOW_SHEET, &[]).await;

    assert!(report.stylable);
    assert_eq!(report.poll_attempts, 3);
    assert!(report.html.contains(r#"<div class="a" style="color: red;">"#));
}

#[tokio::test(start_paused = true)]
async fn test_idle_settling_can_be_disabled() {
    let config = ExportConfig {
        max_attempts: 5,
        settle_when_idle: false,
        ..ExportConfig::default()
    };
    let report = Exporter::new(HeadlessHost::new())
        .with_config(config)
        .unwrap()
        .render_detailed("<p>no sheets</p>", &[])
        .await;
    assert!(!report.stylable);
    assert_eq!(report.poll_attempts, 5);
}

#[tokio::test(start_paused = true)]
async fn test_zero_attempts_skips_the_wait() {
    let config = ExportConfig {
        max_attempts: 0,
        ..ExportConfig::default()
    };
    let exporter = Exporter::new(CountingHost::default())
        .with_config(config)
        .unwrap();
    let report = exporter
        .render_detailed("<p>x</p>", &["p { color: red }"])
        .await;
    assert_eq!(report.poll_attempts, 0);
    assert_eq!(exporter.host().layouts.get(), 0);
    // Inline sheets are readable without a layout pass.
    assert!(report.html.contains(r#"<p style="color: red;">x</p>"#));
}

#[tokio::test(start_paused = true)]
async fn test_panicking_host_falls_back_and_tears_down_once() {
    let exporter = Exporter::new(CountingHost::panicking());
    let report = exporter.render_detailed(SLOW_SHEET, &[]).await;

    assert!(report.fell_back);
    assert_eq!(report.html, SLOW_SHEET);
    assert_eq!(exporter.host().created.get(), 1);
    assert_eq!(exporter.host().destroyed.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_every_export_gets_its_own_sandbox() {
    let exporter = Exporter::new(CountingHost::default());
    for _ in 0..3 {
        let _ = exporter.render("<p>x</p>").await;
    }
    assert_eq!(exporter.host().created.get(), 3);
    assert_eq!(exporter.host().destroyed.get(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_export_still_tears_down() {
    let exporter = Exporter::new(CountingHost::default());
    let outcome =
        tokio::time::timeout(Duration::from_millis(120), exporter.render(SLOW_SHEET)).await;

    assert!(outcome.is_err());
    assert_eq!(exporter.host().created.get(), 1);
    assert_eq!(exporter.host().destroyed.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sandbox_guard_destroys_on_drop() {
    let host = CountingHost::default();
    {
        let mut sandbox = Sandbox::create(&host, "<p>x</p>", Viewport::default()).unwrap();
        let ready = sandbox
            .wait_until_stylable(3, Duration::from_millis(10), true)
            .await
            .unwrap();
        assert!(!ready.ready);
        assert_eq!(ready.attempts, 1);
        assert_eq!(sandbox.document().sheets.len(), 0);
        assert_eq!(host.destroyed.get(), 0);
    }
    assert_eq!(host.destroyed.get(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_refused_sandbox_owes_no_teardown() {
    let host = HeadlessHost::new().refusing_access();
    assert!(matches!(
        Sandbox::create(&host, "<p>x</p>", Viewport::default()),
        Err(ExportError::SandboxUnavailable(_))
    ));
}
