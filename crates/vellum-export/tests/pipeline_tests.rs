//! End-to-end export tests against the headless host.

use vellum_export::{ExportConfig, ExportError, Exporter, HeadlessHost, render};

const WRAPPER: &str = "width:100%; min-height:100%; box-sizing:border-box;";
const PARAGRAPH: &str = "margin:0;display:contents;";

fn exporter() -> Exporter<HeadlessHost> {
    Exporter::new(HeadlessHost::new())
}

fn wrapped(content: &str) -> String {
    format!(r#"<div style="{WRAPPER}">{content}</div>"#)
}

#[tokio::test]
async fn test_mixed_content_is_split_into_runs() {
    let html = exporter()
        .render("<div><b>Hi</b> there<p>World</p></div>")
        .await;
    assert_eq!(
        html,
        wrapped(&format!(
            r#"<div><p style="{PARAGRAPH}"><b>Hi</b> there</p><p>World</p></div>"#
        ))
    );
}

#[tokio::test]
async fn test_pure_inline_content_gets_one_paragraph() {
    let html = exporter()
        .render_with_stylesheets(
            r#"<div class="red">Hello <i>World</i></div>"#,
            &[".red { color: red; }"],
        )
        .await;
    assert_eq!(
        html,
        wrapped(&format!(
            r#"<div class="red" style="color: red;"><p style="{PARAGRAPH}">Hello <i>World</i></p></div>"#
        ))
    );
}

#[tokio::test]
async fn test_body_rules_move_to_the_wrapper() {
    let html = exporter()
        .render(
            "<style>body { background: #fafafa; padding: 16px } p { margin: 0 }</style>\
             <p>x</p>",
        )
        .await;
    assert_eq!(
        html,
        format!(
            r#"<div style="background: #fafafa; padding: 16px; {WRAPPER}"><p style="margin: 0;">x</p></div>"#
        )
    );
}

#[tokio::test]
async fn test_wrapper_style_is_attribute_escaped() {
    let html = exporter()
        .render(r#"<style>html { font-family: "Open Sans", serif }</style><p>x</p>"#)
        .await;
    assert!(html.starts_with(&format!(
        r#"<div style="font-family: &quot;Open Sans&quot;, serif; {WRAPPER}">"#
    )));
}

#[tokio::test]
async fn test_style_and_link_elements_are_removed() {
    let host = HeadlessHost::new().with_stylesheet("theme.css", ".note { color: gray }");
    let report = Exporter::new(host)
        .render_detailed(
            r#"<link rel="stylesheet" href="theme.css"><style>.note { font-size: 12px }</style>
               <div class="note">n<style>.late { color: blue }</style></div>"#,
            &[],
        )
        .await;
    assert!(!report.fell_back);
    assert_eq!(report.sheets, 3);
    assert_eq!(report.style_elements_removed, 3);
    assert!(!report.html.contains("<style"));
    assert!(!report.html.contains("<link"));
    assert!(
        report
            .html
            .contains(r#"class="note" style="color: gray; font-size: 12px;""#)
    );
}

#[tokio::test]
async fn test_cross_origin_sheet_contributes_nothing() {
    let report = exporter()
        .render_detailed(
            r#"<link rel="stylesheet" href="https://cdn.example/x.css"><p class="a">x</p>"#,
            &[".a { color: red }"],
        )
        .await;
    assert!(!report.fell_back);
    assert!(report.stylable);
    assert_eq!(report.rules_indexed, 1);
    assert!(report.html.contains(r#"<p class="a" style="color: red;">x</p>"#));
}

#[tokio::test]
async fn test_importance_survives_export() {
    let html = exporter()
        .render_with_stylesheets(
            r#"<p class="a" style="color: green">x</p>"#,
            &[".a { color: red !important; margin: 0 }"],
        )
        .await;
    assert!(html.contains(r#"style="color: red !important; margin: 0;""#));
}

#[tokio::test]
async fn test_without_sheets_the_wait_settles_immediately() {
    let report = exporter().render_detailed("<p>plain</p>", &[]).await;
    assert!(!report.stylable);
    assert_eq!(report.poll_attempts, 1);
    assert_eq!(report.rules_indexed, 0);
    assert_eq!(report.html, wrapped("<p>plain</p>"));
}

#[tokio::test]
async fn test_report_counters() {
    let report = exporter()
        .render_detailed(
            r#"<div class="x">a<p class="x">b</p></div>"#,
            &[".x { color: red; margin: 0 }", ".x:bogus { color: blue }"],
        )
        .await;
    assert!(report.stylable);
    assert_eq!(report.poll_attempts, 1);
    assert_eq!(report.sheets, 2);
    assert_eq!(report.rules_indexed, 2);
    assert_eq!(report.cascade.rules_matched, 1);
    assert_eq!(report.cascade.selectors_skipped, 1);
    assert_eq!(report.cascade.elements_styled, 2);
    assert_eq!(report.cascade.properties_written, 4);
    assert_eq!(report.paragraphs_synthesized, 1);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["properties_written"], 4);
    assert_eq!(json["fell_back"], false);
}

#[tokio::test]
async fn test_refused_access_returns_input_verbatim() {
    let input = r#"<div class="red">untouched <b>input</b></div>"#;
    let exporter = Exporter::new(HeadlessHost::new().refusing_access());

    let report = exporter.render_detailed(input, &[".red { color: red }"]).await;
    assert!(report.fell_back);
    assert_eq!(report.html, input);

    assert!(matches!(
        exporter.try_render(input).await,
        Err(ExportError::SandboxUnavailable(_))
    ));
}

#[tokio::test]
async fn test_custom_paragraph_and_wrapper_style() {
    let config = ExportConfig {
        paragraph_style: String::new(),
        wrapper_suffix: "max-width:600px;".to_string(),
        ..ExportConfig::default()
    };
    let html = exporter()
        .with_config(config)
        .unwrap()
        .render("<div>text</div>")
        .await;
    assert_eq!(html, r#"<div style="max-width:600px;"><div><p>text</p></div></div>"#);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let config = ExportConfig {
        viewport: vellum_export::Viewport {
            width: 0,
            height: 0,
        },
        ..ExportConfig::default()
    };
    assert!(matches!(
        exporter().with_config(config),
        Err(ExportError::Config(_))
    ));
}

#[tokio::test]
async fn test_render_convenience() {
    assert_eq!(render("hello").await, wrapped(&format!(r#"<p style="{PARAGRAPH}">hello</p>"#)));
}

#[tokio::test]
async fn test_large_document() {
    let mut html = String::new();
    for i in 0..2_000 {
        html.push_str(&format!(
            r#"<div class="row"><span class="c{}">cell {i}</span> tail<p>b</p></div>"#,
            i % 7
        ));
    }
    let report = exporter()
        .render_detailed(&html, &[".row { padding: 1px } .c3 { color: red }"])
        .await;
    assert!(!report.fell_back);
    assert_eq!(report.paragraphs_synthesized, 2_000);
    assert_eq!(report.html.matches("color: red;").count(), 286);
}

#[test]
fn test_deeply_nested_inline_markup_exports() {
    let depth = 10_000;
    let html = format!("{}x", "<span>".repeat(depth));
    let report = std::thread::Builder::new()
        .stack_size(512 * 1024)
        .spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            runtime.block_on(exporter().render_detailed(&html, &[]))
        })
        .unwrap()
        .join()
        .unwrap();

    assert!(!report.fell_back);
    assert_eq!(report.paragraphs_synthesized, 1);
    assert_eq!(report.html.matches("<span>").count(), depth);
    assert!(report.html.contains("x</span>"));
}
