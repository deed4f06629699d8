//! End-to-end reader flow over a real CBZ fixture: open, partition,
//! navigate, re-layout, and render through the scheduler trampoline.

use tempfile::TempDir;

use mangokrat::cbz::{CbzDocument, CbzSource};
use mangokrat::document::{DocumentHandle, DocumentSource, PageHandle};
use mangokrat::errors::LoadError;
use mangokrat::reader::{
    Direction, END_CARD_SUBTITLE, END_CARD_TITLE, PanelState, ReaderConfig, ReaderSession,
    SpreadLayout, SpreadPanels, render_spread,
};
use mangokrat::surface::{DrawingSurface, PixelSurface};
use mangokrat::test_utils::{FakeDocument, write_cbz_fixture};
use mangokrat::viewport::FixedViewport;

fn fixture(pages: &[(u32, u32)]) -> (TempDir, CbzDocument) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("volume.cbz");
    write_cbz_fixture(&path, pages).expect("fixture");
    let doc = CbzDocument::open(&path).expect("open");
    (dir, doc)
}

fn viewport() -> FixedViewport {
    FixedViewport {
        window: (1216.0, 916.0),
        stage: (1216.0, 816.0),
        top_bar_height: 50.0,
        pager_height: 50.0,
        panel_gap: 16.0,
        device_pixel_ratio: 1.0,
    }
}

#[test]
fn cbz_reports_pages_in_entry_order() {
    let (_dir, mut doc) = fixture(&[(60, 90), (80, 120), (60, 90)]);
    assert_eq!(doc.page_count(), 3);

    let page = doc.page(2).expect("page 2");
    assert_eq!(page.natural_size(), (80.0, 120.0));

    assert!(doc.page(0).is_err());
    assert!(doc.page(4).is_err());
}

#[test]
fn archive_without_images_fails_to_load() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("empty.cbz");
    write_cbz_fixture(&path, &[]).expect("fixture");
    match CbzDocument::open(&path) {
        Err(LoadError::NoPages) => {}
        other => panic!("expected NoPages, got {other:?}"),
    }

    assert!(matches!(
        CbzDocument::open(&dir.path().join("missing.cbz")),
        Err(LoadError::Io(_))
    ));
}

#[test]
fn source_resolves_locators_against_the_base_dir() {
    let dir = TempDir::new().expect("temp dir");
    write_cbz_fixture(&dir.path().join("v1.cbz"), &[(60, 90)]).expect("fixture");
    let source = CbzSource::new(dir.path());
    let doc = source.open("v1.cbz").expect("open via source");
    assert_eq!(doc.page_count(), 1);
}

#[test]
fn walking_a_five_page_volume_to_the_end_card() {
    let (_dir, mut doc) = fixture(&[(600, 900); 5]);
    let viewport = viewport();
    let mut panels = SpreadPanels::<PixelSurface>::default();
    let mut session = ReaderSession::new(
        doc.page_count(),
        Direction::Ltr,
        false,
        ReaderConfig::default(),
    );

    // Spreads: [1], [2,3], [4,5], End.
    assert_eq!(session.total_spreads(), 4);

    let mut layouts = Vec::new();
    let mut pass = session.request_render(0);
    while let Some(p) = pass {
        let index = p.index();
        let spread = *session.spread_at(index).unwrap();
        let view = render_spread(
            &mut doc,
            &mut panels,
            &viewport,
            &spread,
            session.direction(),
            session.zoom(),
        )
        .expect("render");
        layouts.push(view.layout);

        pass = session.complete_render();
        if pass.is_none() {
            // Scheduler drained: turn the page, stopping at the end spread.
            pass = session.go_next();
        }
    }

    assert_eq!(
        layouts,
        vec![
            SpreadLayout::Single,
            SpreadLayout::Double,
            SpreadLayout::Double,
            SpreadLayout::Single,
        ]
    );

    // The last render was the end card: fixed 900x1300 design box fit into
    // the panel and drawn with its two text lines.
    let texts: Vec<&str> = panels
        .left
        .texts()
        .iter()
        .map(|t| t.content.as_str())
        .collect();
    assert_eq!(texts, vec![END_CARD_TITLE, END_CARD_SUBTITLE]);
}

#[test]
fn rendered_page_pixels_follow_the_fit_math() {
    let (_dir, mut doc) = fixture(&[(600, 800)]);
    let viewport = viewport();
    let mut panels = SpreadPanels::<PixelSurface>::default();
    let session = ReaderSession::new(1, Direction::Ltr, false, ReaderConfig::default());

    let spread = *session.spread_at(0).unwrap();
    let view = render_spread(
        &mut doc,
        &mut panels,
        &viewport,
        &spread,
        session.direction(),
        session.zoom(),
    )
    .expect("render");

    // Single layout: fit box (1200, 800); fit scale = min(2.0, 1.0) = 1.0,
    // so the page renders at its natural 600x800.
    assert_eq!(
        view.left,
        PanelState::Content {
            width: 600,
            height: 800
        }
    );
    assert_eq!(panels.left.pixel_size(), (600, 800));
    assert_eq!(view.right, PanelState::Hidden);
}

#[test]
fn rtl_direction_draws_the_higher_page_on_the_left() {
    let mut doc = FakeDocument::with_pages(&[(100.0, 150.0); 5]);
    let viewport = viewport();
    let mut panels = SpreadPanels::<PixelSurface>::default();

    let session = ReaderSession::new(5, Direction::Rtl, false, ReaderConfig::default());
    let spread = *session.spread_at(1).unwrap(); // pages [2,3]

    render_spread(
        &mut doc,
        &mut panels,
        &viewport,
        &spread,
        session.direction(),
        session.zoom(),
    )
    .expect("render");

    // Left panel is rendered first: under RTL it must receive page 3.
    let pages: Vec<u32> = doc.render_log().iter().map(|call| call.page).collect();
    assert_eq!(pages, vec![3, 2]);
}

#[test]
fn stale_renders_are_superseded_by_the_latest_request() {
    let (_dir, mut doc) = fixture(&[(60, 90); 7]);
    let viewport = viewport();
    let mut panels = SpreadPanels::<PixelSurface>::default();
    let mut session = ReaderSession::new(
        doc.page_count(),
        Direction::Ltr,
        false,
        ReaderConfig::default(),
    );

    // First render admitted but not yet completed.
    let first = session.request_render(0).expect("admitted");

    // Three rapid navigations while "in flight": all coalesce.
    assert!(session.go_next().is_none());
    assert!(session.go_next().is_none());
    assert!(session.go_next().is_none());
    assert_eq!(session.current_spread(), 3);
    assert_eq!(session.pending_spread(), Some(3));

    let mut executed = Vec::new();
    let mut pass = Some(first);
    while let Some(p) = pass {
        let index = p.index();
        let spread = *session.spread_at(index).unwrap();
        render_spread(
            &mut doc,
            &mut panels,
            &viewport,
            &spread,
            session.direction(),
            session.zoom(),
        )
        .expect("render");
        executed.push(index);
        pass = session.complete_render();
    }

    // Intermediate spreads 1 and 2 were never rendered.
    assert_eq!(executed, vec![0, 3]);
}

#[test]
fn breakpoint_crossing_mid_volume_keeps_the_anchor_page() {
    let (_dir, mut doc) = fixture(&[(60, 90); 7]);
    let wide = viewport();
    let narrow = FixedViewport {
        window: (640.0, 916.0),
        stage: (640.0, 816.0),
        ..wide
    };
    let mut panels = SpreadPanels::<PixelSurface>::default();
    let mut session = ReaderSession::new(
        doc.page_count(),
        Direction::Ltr,
        false,
        ReaderConfig::default(),
    );

    for _ in 0..2 {
        let pass = session.go_next();
        assert!(pass.is_some());
        let _ = session.complete_render();
    }
    assert_eq!(session.anchor_page(), Some(4));

    let pass = session.on_viewport_change(narrow.window.0).expect("render");
    let spread = *session.spread_at(pass.index()).unwrap();
    let view = render_spread(
        &mut doc,
        &mut panels,
        &narrow,
        &spread,
        session.direction(),
        session.zoom(),
    )
    .expect("render");
    assert!(session.complete_render().is_none());

    assert!(session.single_page_mode());
    assert_eq!(session.anchor_page(), Some(4));
    assert_eq!(view.layout, SpreadLayout::Single);
    assert_eq!(view.right, PanelState::Hidden);
}
