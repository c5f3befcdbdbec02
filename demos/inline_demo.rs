//! Inline editing demo.
//!
//! Builds a small page (a heading pair and three sections), turns edit mode
//! on, walks the selection with Ctrl+Shift and edits the focused region,
//! then prints the exported contents.
//!
//! Key events are scripted crossterm events, so this runs without a TTY.
//!
//! Run with: RUST_LOG=inline_cms=debug cargo run --example inline_demo

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use tracing_subscriber::EnvFilter;

use inline_cms::{Cms, CmsConfig, CodeContext, InlineProps, InlineRegion, KeyInput};

const SEED: &str = r#"{
    "App.H1": "🃏 This is a test App",
    "App.Section1.Title": "First section"
}"#;

fn modifier(code: ModifierKeyCode, kind: KeyEventKind) -> KeyEvent {
    KeyEvent::new_with_kind(KeyCode::Modifier(code), KeyModifiers::NONE, kind)
}

fn feed(cms: &Cms, event: KeyEvent) {
    if let Some(input) = KeyInput::from_crossterm(&event) {
        cms.handle_key(input);
    }
}

fn advance(cms: &Cms) {
    feed(cms, modifier(ModifierKeyCode::LeftControl, KeyEventKind::Press));
    feed(cms, modifier(ModifierKeyCode::LeftShift, KeyEventKind::Press));
    feed(cms, modifier(ModifierKeyCode::LeftShift, KeyEventKind::Release));
    feed(cms, modifier(ModifierKeyCode::LeftControl, KeyEventKind::Release));
}

fn print_page(regions: &[InlineRegion]) {
    for region in regions {
        let view = region.view();
        let marker = match (view.selected, view.editable) {
            (true, _) => ">",
            (false, true) => "*",
            (false, false) => " ",
        };
        println!("{marker} {:<24} {}", view.code, view.content);
    }
    println!();
}

fn main() -> inline_cms::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cms = Cms::new(CmsConfig::default());
    cms.init_from_json(SEED)?;

    let app = CodeContext::for_component("App");
    let mut regions = vec![
        InlineRegion::mount(&cms, &app, InlineProps::new("This is a test App").code("H1")),
        InlineRegion::mount(
            &cms,
            &app,
            InlineProps::new("You can handle your contents with this CMS").code("H2"),
        ),
    ];
    for section in ["Section1", "Section2", "Section3"] {
        app.scope(section, |ctx| {
            regions.push(InlineRegion::mount(&cms, ctx, InlineProps::new("Example title").code("Title")));
            regions.push(InlineRegion::mount(
                &cms,
                ctx,
                InlineProps::new("Lorem ipsum dolor sit amet").code("Description"),
            ));
        });
    }

    println!("-- read only");
    print_page(&regions);

    cms.set_enabled(true);
    advance(&cms);
    advance(&cms);
    advance(&cms);

    println!("-- editing, third region focused");
    print_page(&regions);

    if let Some(focused) = regions.iter().find(|region| region.is_selected()) {
        focused.set_content("Edited from the keyboard");
    }
    if let Some(prompt) = cms.exit_confirmation() {
        println!("exit guard: {prompt}");
    }

    cms.set_enabled(false);
    println!("-- after editing");
    print_page(&regions);

    println!("{}", cms.export()?);

    for region in regions {
        region.unmount();
    }
    cms.teardown();
    Ok(())
}
