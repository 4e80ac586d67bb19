//! Slide-deck rendering.
//!
//! The deck is a title slide followed by one or more "Dashboard Status"
//! slides, each carrying a page of the KPI table with status-coloured cells.

mod package;
mod slides;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::DeckError;
use crate::models::{KpiRecord, StatusCounts};

pub struct DeckInput<'a> {
    pub company_name: &'a str,
    pub records: &'a [KpiRecord],
    pub rows_per_slide: usize,
    pub generated_at: DateTime<Utc>,
}

pub fn deck_title(company_name: &str) -> String {
    format!("Marketing KPI Dashboard - {} Benchmarks", company_name)
}

/// `Marketing_KPI_Dashboard_<company>.pptx`, with spaces and path
/// separators replaced by underscores.
pub fn file_name(company_name: &str) -> String {
    let company: String = company_name
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect();
    format!("Marketing_KPI_Dashboard_{}.pptx", company)
}

pub fn render(input: &DeckInput<'_>) -> Result<Vec<u8>, DeckError> {
    if input.records.is_empty() {
        return Err(DeckError::Empty);
    }

    let title = deck_title(input.company_name);
    let counts = StatusCounts::tally(input.records);
    let pages: Vec<&[KpiRecord]> = input.records.chunks(input.rows_per_slide.max(1)).collect();

    let mut rendered = Vec::with_capacity(pages.len() + 1);
    rendered.push(slides::title_slide(&title));
    for (index, page) in pages.iter().enumerate() {
        let heading = if pages.len() == 1 {
            "Dashboard Status".to_string()
        } else {
            format!("Dashboard Status ({}/{})", index + 1, pages.len())
        };
        let summary = (index == 0).then(|| counts.to_string());
        rendered.push(slides::status_slide(&heading, summary.as_deref(), page));
    }

    let bytes = package::write(&title, &rendered, input.generated_at)?;
    info!(
        slides = rendered.len(),
        records = input.records.len(),
        bytes = bytes.len(),
        "rendered deck"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use chrono::TimeZone;
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn record(kpi: &str, benchmark: f64, actual: f64, direction: Direction) -> KpiRecord {
        KpiRecord::new("Events", kpi, benchmark, actual, direction).unwrap()
    }

    fn sample_records() -> Vec<KpiRecord> {
        vec![
            record("Registrations", 500.0, 520.0, Direction::HigherIsBetter),
            record("Cost per Lead", 40.0, 43.0, Direction::LowerIsBetter),
            record("Booth Visits", 300.0, 120.0, Direction::HigherIsBetter),
        ]
    }

    fn render_with(company: &str, records: &[KpiRecord], rows_per_slide: usize) -> Vec<u8> {
        render(&DeckInput {
            company_name: company,
            records,
            rows_per_slide,
            generated_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        })
        .unwrap()
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut contents = String::new();
        part.read_to_string(&mut contents).unwrap();
        contents
    }

    fn count_elements(xml: &str, tag: &[u8]) -> usize {
        let mut reader = Reader::from_str(xml);
        let mut count = 0;
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) if e.name().as_ref() == tag => count += 1,
                Ok(Event::Eof) => break,
                Err(e) => panic!("malformed xml: {e}"),
                _ => {}
            }
        }
        count
    }

    #[test]
    fn package_contains_every_part_and_is_well_formed() {
        let bytes = render_with("Acme", &sample_records(), 12);
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();

        for expected in [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "docProps/app.xml",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
        assert!(!names.iter().any(|n| n == "ppt/slides/slide3.xml"));

        for index in 0..archive.len() {
            let mut part = archive.by_index(index).unwrap();
            let mut contents = String::new();
            part.read_to_string(&mut contents).unwrap();
            count_elements(&contents, b"none");
        }
    }

    #[test]
    fn title_slide_carries_company_name() {
        let bytes = render_with("Acme Corp", &sample_records(), 12);
        let slide = read_part(&bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains("Marketing KPI Dashboard - Acme Corp Benchmarks"));
        assert!(slide.contains("Status view across Campaign Types and KPIs"));

        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("2026-03-01T09:30:00Z"));
    }

    #[test]
    fn company_name_is_escaped() {
        let bytes = render_with("Smith & Sons <UK>", &sample_records(), 12);
        let slide = read_part(&bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains("Smith &amp; Sons &lt;UK&gt;"));
        count_elements(&slide, b"a:t");
    }

    #[test]
    fn status_slide_lists_records_with_colours() {
        let bytes = render_with("Acme", &sample_records(), 12);
        let slide = read_part(&bytes, "ppt/slides/slide2.xml");

        assert_eq!(count_elements(&slide, b"a:tr"), 4);
        assert!(slide.contains("<a:t>Dashboard Status</a:t>"));
        assert!(slide.contains("Green: 1 · Yellow: 1 · Red: 1"));
        assert!(slide.contains("<a:t>Registrations</a:t>"));
        assert!(slide.contains("<a:t>500</a:t>"));
        assert!(slide.contains("<a:t>LowerIsBetter</a:t>"));
        for colour in ["228B22", "FFA500", "DC143C"] {
            assert!(slide.contains(&format!(r#"<a:srgbClr val="{colour}"/>"#)));
        }

        let order: Vec<usize> = ["Registrations", "Cost per Lead", "Booth Visits"]
            .iter()
            .map(|name| slide.find(&format!("<a:t>{name}</a:t>")).unwrap())
            .collect();
        assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn paginates_long_tables() {
        let records: Vec<KpiRecord> = (0..25)
            .map(|i| record(&format!("KPI {i}"), 100.0, 95.0, Direction::HigherIsBetter))
            .collect();
        let bytes = render_with("Acme", &records, 12);

        let presentation = read_part(&bytes, "ppt/presentation.xml");
        assert_eq!(count_elements(&presentation, b"p:sldIdLst"), 1);
        assert_eq!(presentation.matches("<p:sldId ").count(), 4);

        let first = read_part(&bytes, "ppt/slides/slide2.xml");
        let last = read_part(&bytes, "ppt/slides/slide4.xml");
        assert!(first.contains("Dashboard Status (1/3)"));
        assert!(first.contains("Green: 0 · Yellow: 25 · Red: 0"));
        assert!(last.contains("Dashboard Status (3/3)"));
        assert!(!last.contains("Yellow: 25"));
        assert_eq!(count_elements(&first, b"a:tr"), 13);
        assert_eq!(count_elements(&last, b"a:tr"), 2);
    }

    #[test]
    fn empty_deck_is_refused() {
        let result = render(&DeckInput {
            company_name: "Acme",
            records: &[],
            rows_per_slide: 12,
            generated_at: Utc::now(),
        });
        assert!(matches!(result, Err(DeckError::Empty)));
    }

    #[test]
    fn file_name_replaces_spaces() {
        assert_eq!(
            file_name("Your Company"),
            "Marketing_KPI_Dashboard_Your_Company.pptx"
        );
        assert_eq!(file_name("A/B Test"), "Marketing_KPI_Dashboard_A_B_Test.pptx");
    }
}
