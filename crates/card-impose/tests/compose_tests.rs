use card_impose::layout::Rect;
use card_impose::marks::LineSegment;
use card_impose::*;
use image::DynamicImage;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Begin(SheetSide),
    Image { source: PathBuf, rect: Rect },
    Line(LineSegment),
    End,
}

/// Renderer that records every call instead of drawing
#[derive(Default)]
struct RecordingRenderer {
    events: Vec<Event>,
    pages: usize,
}

impl PageRenderer for RecordingRenderer {
    type Output = Vec<Event>;

    fn begin_page(&mut self, side: SheetSide) -> card_impose::Result<()> {
        self.pages += 1;
        self.events.push(Event::Begin(side));
        Ok(())
    }

    fn draw_image(&mut self, asset: &RenderedAsset, rect: &Rect) -> card_impose::Result<()> {
        assert!(asset.path().exists(), "asset drawn after release");
        self.events.push(Event::Image {
            source: asset.source().to_path_buf(),
            rect: *rect,
        });
        Ok(())
    }

    fn draw_line(&mut self, line: &LineSegment, _stroke_mm: f32) -> card_impose::Result<()> {
        self.events.push(Event::Line(*line));
        Ok(())
    }

    fn end_page(&mut self) -> card_impose::Result<()> {
        self.events.push(Event::End);
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn finish(self) -> card_impose::Result<Vec<Event>> {
        Ok(self.events)
    }
}

fn make_asset(name: &str) -> RenderedAsset {
    let image = DynamicImage::new_rgb8(4, 6);
    RenderedAsset::from_image(&image, PathBuf::from(name), 1.0).unwrap()
}

fn make_slots(count: usize) -> Vec<Option<RenderedAsset>> {
    (0..count)
        .map(|i| Some(make_asset(&format!("card{:02}.png", i))))
        .collect()
}

fn a4_geometry() -> SheetGeometry {
    SheetGeometry::new(210.0, 297.0, 59.0, 86.0, 5.0)
}

fn page_sides(events: &[Event]) -> Vec<SheetSide> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Begin(side) => Some(*side),
            _ => None,
        })
        .collect()
}

/// Events of every page, split at `Begin`
fn pages(events: &[Event]) -> Vec<Vec<Event>> {
    let mut pages: Vec<Vec<Event>> = Vec::new();
    for event in events {
        if matches!(event, Event::Begin(_)) {
            pages.push(Vec::new());
        }
        if let Some(page) = pages.last_mut() {
            page.push(event.clone());
        }
    }
    pages
}

fn line_count(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::Line(_)))
        .count()
}

fn image_rects(page: &[Event]) -> Vec<(PathBuf, Rect)> {
    page.iter()
        .filter_map(|e| match e {
            Event::Image { source, rect } => Some((source.clone(), *rect)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_simplex_single_partial_page() {
    let geometry = a4_geometry();
    let mut renderer = RecordingRenderer::default();
    let mut page_events = Vec::new();

    let summary = compose_sheets(
        &mut renderer,
        make_slots(7),
        &geometry,
        &ComposeOptions::default(),
        None,
        ComposeMode::Simplex,
        &CancelToken::new(),
        &mut |done, total| page_events.push((done, total)),
    )
    .unwrap();

    assert_eq!(summary.pages, vec![SheetSide::Front]);
    assert_eq!(summary.cards_placed, 7);
    assert_eq!(page_events, vec![(1, 1)]);

    let events = renderer.finish().unwrap();
    assert_eq!(line_count(&events), 7 * 8);
}

#[test]
fn test_duplex_back_before_front() {
    let geometry = a4_geometry();
    let back = make_asset("back.png");
    let mut renderer = RecordingRenderer::default();

    let summary = compose_sheets(
        &mut renderer,
        make_slots(20),
        &geometry,
        &ComposeOptions::default(),
        Some(&back),
        ComposeMode::Duplex,
        &CancelToken::new(),
        &mut |_, _| {},
    )
    .unwrap();

    let expected = vec![
        SheetSide::Back,
        SheetSide::Front,
        SheetSide::Back,
        SheetSide::Front,
        SheetSide::Back,
        SheetSide::Front,
    ];
    assert_eq!(summary.pages, expected);
    assert_eq!(summary.cards_placed, 20);
    assert_eq!(renderer.page_count(), 6);
    assert_eq!(page_sides(&renderer.finish().unwrap()), expected);
}

#[test]
fn test_back_slots_mirror_front_slots() {
    let geometry = a4_geometry();
    let back = make_asset("back.png");
    let mut renderer = RecordingRenderer::default();

    compose_sheets(
        &mut renderer,
        make_slots(11),
        &geometry,
        &ComposeOptions::default(),
        Some(&back),
        ComposeMode::Duplex,
        &CancelToken::new(),
        &mut |_, _| {},
    )
    .unwrap();

    let events = renderer.finish().unwrap();
    let pages = pages(&events);
    assert_eq!(pages.len(), 4);

    for sheet in pages.chunks(2) {
        let backs = image_rects(&sheet[0]);
        let fronts = image_rects(&sheet[1]);
        assert_eq!(backs.len(), fronts.len());

        for ((back_source, back_rect), (_, front_rect)) in backs.iter().zip(&fronts) {
            assert_eq!(back_source, &PathBuf::from("back.png"));
            let expected_x = geometry.page_width - front_rect.x - geometry.card_width;
            assert!((back_rect.x - expected_x).abs() < 1e-4);
            assert!((back_rect.y - front_rect.y).abs() < 1e-4);
        }
    }

    // Second sheet holds two cards: back page fills the mirrored slots only
    assert_eq!(image_rects(&pages[2]).len(), 2);
}

#[test]
fn test_back_pages_have_no_crop_marks() {
    let back = make_asset("back.png");
    let mut renderer = RecordingRenderer::default();

    compose_sheets(
        &mut renderer,
        make_slots(3),
        &a4_geometry(),
        &ComposeOptions::default(),
        Some(&back),
        ComposeMode::Duplex,
        &CancelToken::new(),
        &mut |_, _| {},
    )
    .unwrap();

    let events = renderer.finish().unwrap();
    let pages = pages(&events);
    assert_eq!(line_count(&pages[0]), 0);
    assert_eq!(line_count(&pages[1]), 24);
}

#[test]
fn test_crop_marks_disabled() {
    let mut renderer = RecordingRenderer::default();
    let options = ComposeOptions {
        show_crop_marks: false,
        ..ComposeOptions::default()
    };

    compose_sheets(
        &mut renderer,
        make_slots(4),
        &a4_geometry(),
        &options,
        None,
        ComposeMode::Simplex,
        &CancelToken::new(),
        &mut |_, _| {},
    )
    .unwrap();

    let events = renderer.finish().unwrap();
    assert_eq!(line_count(&events), 0);
}

#[test]
fn test_skipped_slots_are_compacted_in_order() {
    let geometry = a4_geometry();
    let mut slots = make_slots(5);
    slots[1] = None;
    slots[3] = None;
    let mut renderer = RecordingRenderer::default();

    let summary = compose_sheets(
        &mut renderer,
        slots,
        &geometry,
        &ComposeOptions::default(),
        None,
        ComposeMode::Simplex,
        &CancelToken::new(),
        &mut |_, _| {},
    )
    .unwrap();
    assert_eq!(summary.cards_placed, 3);

    let events = renderer.finish().unwrap();
    let placed = image_rects(&events);
    let sources: Vec<PathBuf> = placed.iter().map(|(s, _)| s.clone()).collect();
    assert_eq!(
        sources,
        vec![
            PathBuf::from("card00.png"),
            PathBuf::from("card02.png"),
            PathBuf::from("card04.png"),
        ]
    );

    // Surviving cards take the first slots
    let slots = geometry.slot_positions();
    for ((_, rect), slot) in placed.iter().zip(&slots) {
        assert_eq!((rect.x, rect.y), (slot.x, slot.y));
    }
}

#[test]
fn test_assets_released_after_drawing() {
    let slots = make_slots(10);
    let paths: Vec<PathBuf> = slots
        .iter()
        .flatten()
        .map(|asset| asset.path().to_path_buf())
        .collect();
    assert!(paths.iter().all(|p| p.exists()));

    let mut renderer = RecordingRenderer::default();
    compose_sheets(
        &mut renderer,
        slots,
        &a4_geometry(),
        &ComposeOptions::default(),
        None,
        ComposeMode::Simplex,
        &CancelToken::new(),
        &mut |_, _| {},
    )
    .unwrap();

    assert!(paths.iter().all(|p| !p.exists()));
}

#[test]
fn test_duplex_without_back_asset() {
    let mut renderer = RecordingRenderer::default();
    let result = compose_sheets(
        &mut renderer,
        make_slots(2),
        &a4_geometry(),
        &ComposeOptions::default(),
        None,
        ComposeMode::Duplex,
        &CancelToken::new(),
        &mut |_, _| {},
    );

    assert!(matches!(result, Err(CardImposeError::MissingBackAsset)));
    assert_eq!(renderer.page_count(), 0);
}

#[test]
fn test_cancelled_composition_cleans_up() {
    let slots = make_slots(12);
    let paths: Vec<PathBuf> = slots
        .iter()
        .flatten()
        .map(|asset| asset.path().to_path_buf())
        .collect();

    let cancel = CancelToken::new();
    let mut renderer = RecordingRenderer::default();
    let result = compose_sheets(
        &mut renderer,
        slots,
        &a4_geometry(),
        &ComposeOptions::default(),
        None,
        ComposeMode::Simplex,
        &cancel,
        &mut |done, _| {
            if done == 1 {
                cancel.cancel();
            }
        },
    );

    assert!(matches!(result, Err(CardImposeError::Cancelled)));
    assert_eq!(renderer.page_count(), 1);
    assert!(paths.iter().all(|p| !p.exists()));
}

#[test]
fn test_trim_inset_moves_marks_not_images() {
    let geometry = a4_geometry();
    let options = ComposeOptions {
        trim_inset_mm: 2.0,
        ..ComposeOptions::default()
    };
    let mut renderer = RecordingRenderer::default();

    compose_sheets(
        &mut renderer,
        make_slots(1),
        &geometry,
        &options,
        None,
        ComposeMode::Simplex,
        &CancelToken::new(),
        &mut |_, _| {},
    )
    .unwrap();

    let events = renderer.finish().unwrap();
    let placed = image_rects(&events);
    let card = placed[0].1;
    assert_eq!(card.width, geometry.card_width);
    assert_eq!(card.height, geometry.card_height);

    let first_mark = events.iter().find_map(|e| match e {
        Event::Line(line) => Some(*line),
        _ => None,
    });
    let first_mark = first_mark.unwrap();
    assert!((first_mark.x1 - (card.x + 2.0)).abs() < 1e-4);
    assert!((first_mark.y1 - (card.y + 2.0)).abs() < 1e-4);
}
