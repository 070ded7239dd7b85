//! Render and export contracts.

use cardforge_core::export::{encode_pdf, ExportError};
use cardforge_core::pipeline::{card_file_name, BatchRequest, CardPipeline, PipelineError};
use cardforge_core::render::layout::{layout_rules_text, CardLayout, RulesLineKind};
use cardforge_core::render::font::Font;
use cardforge_core::{
    card_fingerprint, CardDraft, CardOverrides, CardRenderer, Color, ColorIdentity, ExportFormat, ManaCost,
    PrintSpec, RenderSettings,
};
use proptest::prelude::*;
use std::fs;
use tempfile::tempdir;

fn long_ability(n: usize) -> String {
    format!(
        "When this creature enters the battlefield, target opponent reveals their hand and discards {} cards of your choice.",
        n
    )
}

fn wordy_card(ability_count: usize) -> cardforge_core::Card {
    CardDraft {
        name: "Archivist of the Sunken Library".into(),
        color_identity: ColorIdentity::new([Color::Blue, Color::Black]),
        mana_cost: ManaCost::new(4, [(Color::Blue, 1), (Color::Black, 1)]),
        type_line: "Creature \u{2014} Merfolk Wizard".into(),
        abilities: (0..ability_count).map(long_ability).collect(),
        power: Some(2),
        toughness: Some(5),
        flavor_text: "Every drowned book still has a reader.".into(),
        artist: "Test Artist".into(),
        set_code: "CFG".into(),
        collector_number: "042".into(),
        artwork: None,
    }
    .validate()
    .unwrap()
}

#[test]
fn invariant_png_export_round_trips() {
    let dir = tempdir().unwrap();
    let pipeline = CardPipeline::default();
    let card = pipeline.generate(10, &CardOverrides::default()).unwrap();
    let path = dir.path().join("seed10.png");

    pipeline.export(&card, &path, ExportFormat::Png).unwrap();

    let reloaded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(reloaded.dimensions(), (750, 1050));
    assert_eq!(reloaded, pipeline.render(&card).unwrap());
}

#[test]
fn invariant_pdf_export_preserves_page_and_image_size() {
    let dir = tempdir().unwrap();
    let pipeline = CardPipeline::default();
    let card = pipeline.generate(11, &CardOverrides::default()).unwrap();
    let path = dir.path().join("card.pdf");

    let fingerprint = pipeline.export(&card, &path, ExportFormat::Pdf).unwrap();

    let bytes = fs::read(&path).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.starts_with("%PDF-1.4"));
    assert!(text.contains("/MediaBox [0 0 180.00 252.00]"));
    assert!(text.contains("/Width 750 /Height 1050"));
    assert!(text.contains(&format!("/ID [<{0}> <{0}>]", &fingerprint[..32])));

    let marker = b"/DCTDecode";
    let at = bytes.windows(marker.len()).position(|w| w == marker).unwrap();
    let start = at + bytes[at..].windows(7).position(|w| w == b"stream\n").unwrap() + 7;
    let end = start + bytes[start..].windows(10).position(|w| w == b"\nendstream").unwrap();
    let embedded = image::load_from_memory(&bytes[start..end]).unwrap();
    assert_eq!((embedded.width(), embedded.height()), (750, 1050));
}

#[test]
fn invariant_pdf_follows_dpi() {
    let image = CardRenderer::default().render(&wordy_card(1)).unwrap();
    let pdf = encode_pdf(&image, &PrintSpec::from_user(150).unwrap(), "").unwrap();
    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("/Width 375 /Height 525"));
    assert!(text.contains("/MediaBox [0 0 180.00 252.00]"));
}

#[test]
fn invariant_render_is_idempotent() {
    let renderer = CardRenderer::default();
    let pipeline = CardPipeline::default();
    for seed in [1, 2, 3] {
        let card = pipeline.generate(seed, &CardOverrides::default()).unwrap();
        assert_eq!(renderer.render(&card).unwrap(), renderer.render(&card).unwrap());
    }
}

#[test]
fn invariant_palette_follows_primary_color() {
    let renderer = CardRenderer::default();
    let red = CardDraft {
        color_identity: ColorIdentity::new([Color::Red]),
        mana_cost: ManaCost::new(1, [(Color::Red, 1)]),
        ..wordy_card(1).to_draft()
    }
    .validate()
    .unwrap();
    let green = CardDraft {
        color_identity: ColorIdentity::new([Color::Green]),
        mana_cost: ManaCost::new(1, [(Color::Green, 1)]),
        ..red.to_draft()
    }
    .validate()
    .unwrap();
    // Frame gradient just inside the border, left of the header.
    let (x, y) = (22, 300);
    assert_ne!(
        renderer.render(&red).unwrap().get_pixel(x, y),
        renderer.render(&green).unwrap().get_pixel(x, y)
    );
}

#[test]
fn invariant_wordy_rules_text_fits_or_is_bounded() {
    let renderer = CardRenderer::default();
    let layout = CardLayout::standard();
    let area = layout.rules_text_area();
    for count in 1..=6 {
        let card = wordy_card(count);
        let rules = renderer.layout_rules(&card);
        let font = Font::new(rules.font_size);
        let italic = Font::italic(rules.font_size);
        assert!(rules.font_size >= renderer.settings().min_rules_font_size);
        assert!(rules.height <= layout.rules_text_height(true));
        for line in &rules.lines {
            let face = if line.kind == RulesLineKind::Flavor { italic } else { font };
            assert!(line.x_offset + face.measure(&line.text) <= area.w, "{:?}", line);
        }
        assert!(renderer.render(&card).is_ok());
    }
    assert!(renderer.layout_rules(&wordy_card(6)).font_size < renderer.settings().rules_font_size);
}

#[test]
fn invariant_batch_names_numbers_and_orders_cards() {
    let dir = tempdir().unwrap();
    let request = BatchRequest {
        base_seed: 100,
        count: 3,
        output_dir: dir.path().join("out"),
        format: ExportFormat::Png,
        ..Default::default()
    };
    let report = CardPipeline::default().run_batch(&request).unwrap();
    assert!(report.is_success());

    let exported: Vec<_> = report.exported().collect();
    assert_eq!(exported.len(), 3);
    for (i, card) in exported.iter().enumerate() {
        assert_eq!(card.index, i as u32);
        assert_eq!(card.seed, 100 + i as u64);
        assert!(card.path.exists());
        let file_name = card.path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(file_name, card_file_name(&card.name, i as u32, 3, ExportFormat::Png));
        assert!(file_name.ends_with(&format!("_{}.png", i + 1)));
    }

    let pipeline = CardPipeline::default();
    let overrides = CardOverrides {
        collector_number: Some("002/003".into()),
        ..Default::default()
    };
    let second = pipeline.generate(101, &overrides).unwrap();
    assert_eq!(card_fingerprint(&second).unwrap(), exported[1].fingerprint);
}

#[test]
fn invariant_parallel_batch_matches_sequential() {
    let dir = tempdir().unwrap();
    let pipeline = CardPipeline::default();
    let sequential = BatchRequest {
        base_seed: 500,
        count: 4,
        output_dir: dir.path().join("seq"),
        ..Default::default()
    };
    let parallel = BatchRequest {
        output_dir: dir.path().join("par"),
        parallel: true,
        ..sequential.clone()
    };
    let a: Vec<_> = pipeline
        .run_batch(&sequential)
        .unwrap()
        .exported()
        .map(|c| c.fingerprint.clone())
        .collect();
    let b: Vec<_> = pipeline
        .run_batch(&parallel)
        .unwrap()
        .exported()
        .map(|c| c.fingerprint.clone())
        .collect();
    assert_eq!(a.len(), 4);
    assert_eq!(a, b);
}

#[test]
fn invariant_invalid_output_dir_fails_whole_batch() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"x").unwrap();
    let request = BatchRequest {
        count: 2,
        output_dir: blocker.clone(),
        ..Default::default()
    };
    let err = CardPipeline::default().run_batch(&request).unwrap_err();
    assert!(matches!(err, PipelineError::Export(ExportError::InvalidDirectory { .. })));
    assert!(err.to_string().contains("not-a-dir"));
}

#[test]
fn invariant_failed_cards_leave_no_files() {
    let dir = tempdir().unwrap();
    let request = BatchRequest {
        count: 2,
        output_dir: dir.path().to_path_buf(),
        overrides: CardOverrides {
            type_line: Some("Instant".into()),
            power: Some(2),
            ..Default::default()
        },
        ..Default::default()
    };
    let report = CardPipeline::default().run_batch(&request).unwrap();
    assert!(!report.is_success());
    assert_eq!(report.failures().count(), 2);
    for (outcome, err) in report.failures() {
        assert!(matches!(err, PipelineError::Generation(_)), "card {}", outcome.index);
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_rules_lines_fit_box(
        lengths in prop::collection::vec(1usize..120, 0..8),
        flavor_words in 0usize..40,
        width in 120u32..640,
        height in 40u32..300,
    ) {
        let settings = RenderSettings::default();
        let abilities: Vec<String> = lengths
            .iter()
            .map(|n| "Whenever a spell resolves draw".split(' ').cycle().take(*n).collect::<Vec<_>>().join(" "))
            .collect();
        let flavor = vec!["ancient"; flavor_words].join(" ");

        let layout = layout_rules_text(&abilities, &flavor, width, height, &settings);
        let font = Font::new(layout.font_size);
        let italic = Font::italic(layout.font_size);

        prop_assert!(layout.font_size >= settings.min_rules_font_size);
        prop_assert!(layout.font_size <= settings.rules_font_size);
        for line in &layout.lines {
            prop_assert!(line.y_offset + line.height <= height);
            let face = if line.kind == RulesLineKind::Flavor { italic } else { font };
            prop_assert!(line.x_offset + face.measure(&line.text) <= width, "{:?}", line);
        }
    }

    #[test]
    fn prop_more_text_never_grows_font(
        lengths in prop::collection::vec(1usize..60, 1..5),
        extra in 1usize..60,
    ) {
        let settings = RenderSettings::default();
        let make = |n: &usize| "Counter target spell with".split(' ').cycle().take(*n).collect::<Vec<_>>().join(" ");
        let base: Vec<String> = lengths.iter().map(make).collect();
        let mut more = base.clone();
        more.push(make(&extra));

        let a = layout_rules_text(&base, "", 634, 200, &settings);
        let b = layout_rules_text(&more, "", 634, 200, &settings);
        prop_assert!(b.font_size <= a.font_size);
    }
}
