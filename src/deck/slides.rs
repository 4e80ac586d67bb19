use std::fmt::Write;

use quick_xml::escape::escape;

use crate::ingest::format_number;
use crate::models::KpiRecord;

const EMU_PER_INCH: f64 = 914_400.0;

const TEXT_DARK: &str = "333333";
const TEXT_MUTED: &str = "666666";
const TEXT_LIGHT: &str = "FFFFFF";
const HEADER_FILL: &str = "333333";

const TABLE_HEADERS: [&str; 6] = [
    "Campaign Type",
    "KPI Name",
    "Benchmark",
    "Actual",
    "Direction",
    "Status",
];
const COLUMN_WIDTHS_IN: [f64; 6] = [1.5, 2.5, 1.2, 1.2, 1.5, 1.1];
const TABLE_ROW_HEIGHT_IN: f64 = 0.37;

const SLIDE_OPEN: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#,
    r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
);
const SLIDE_CLOSE: &str =
    r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#;

/// Position and size in inches.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug, Clone, Copy)]
struct Font {
    /// Points
    size: u32,
    bold: bool,
    color: &'static str,
}

fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

fn run_xml(out: &mut String, text: &str, font: Font) {
    let _ = write!(
        out,
        r#"<a:r><a:rPr lang="en-US" sz="{}" b="{}" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:rPr><a:t>{}</a:t></a:r>"#,
        font.size * 100,
        u8::from(font.bold),
        font.color,
        escape(text)
    );
}

fn text_box(out: &mut String, id: u32, name: &str, frame: Frame, align: &str, text: &str, font: Font) {
    let _ = write!(
        out,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" rtlCol="0"/><a:lstStyle/><a:p><a:pPr algn="{align}"/>"#,
        emu(frame.x),
        emu(frame.y),
        emu(frame.width),
        emu(frame.height),
    );
    run_xml(out, text, font);
    out.push_str("</a:p></p:txBody></p:sp>");
}

fn table_cell(out: &mut String, text: &str, font: Font, fill: Option<&str>) {
    out.push_str("<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p>");
    run_xml(out, text, font);
    out.push_str("</a:p></a:txBody><a:tcPr>");
    if let Some(fill) = fill {
        let _ = write!(out, r#"<a:solidFill><a:srgbClr val="{fill}"/></a:solidFill>"#);
    }
    out.push_str("</a:tcPr></a:tc>");
}

pub fn title_slide(title: &str) -> String {
    let mut out = String::from(SLIDE_OPEN);
    text_box(
        &mut out,
        2,
        "Title",
        Frame {
            x: 0.5,
            y: 2.3,
            width: 9.0,
            height: 1.5,
        },
        "ctr",
        title,
        Font {
            size: 44,
            bold: false,
            color: TEXT_DARK,
        },
    );
    text_box(
        &mut out,
        3,
        "Subtitle",
        Frame {
            x: 0.5,
            y: 4.0,
            width: 9.0,
            height: 1.0,
        },
        "ctr",
        "Status view across Campaign Types and KPIs",
        Font {
            size: 24,
            bold: false,
            color: TEXT_MUTED,
        },
    );
    out.push_str(SLIDE_CLOSE);
    out
}

/// A "Dashboard Status" slide holding one page of the KPI table.
pub fn status_slide(title: &str, summary: Option<&str>, records: &[KpiRecord]) -> String {
    let mut out = String::from(SLIDE_OPEN);
    text_box(
        &mut out,
        2,
        "Slide Title",
        Frame {
            x: 0.5,
            y: 0.3,
            width: 9.0,
            height: 0.8,
        },
        "l",
        title,
        Font {
            size: 32,
            bold: false,
            color: TEXT_DARK,
        },
    );
    if let Some(summary) = summary {
        text_box(
            &mut out,
            3,
            "Status Summary",
            Frame {
                x: 0.5,
                y: 0.95,
                width: 9.0,
                height: 0.4,
            },
            "l",
            summary,
            Font {
                size: 14,
                bold: false,
                color: TEXT_MUTED,
            },
        );
    }

    let table_height = TABLE_ROW_HEIGHT_IN * (records.len() + 1) as f64;
    let _ = write!(
        out,
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="4" name="KPI Table"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr><p:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></p:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr firstRow="1" bandRow="1"/><a:tblGrid>"#,
        emu(0.5),
        emu(1.4),
        emu(COLUMN_WIDTHS_IN.iter().sum()),
        emu(table_height),
    );
    for width in COLUMN_WIDTHS_IN {
        let _ = write!(out, r#"<a:gridCol w="{}"/>"#, emu(width));
    }
    out.push_str("</a:tblGrid>");

    let row_height = emu(TABLE_ROW_HEIGHT_IN);
    let header_font = Font {
        size: 12,
        bold: true,
        color: TEXT_LIGHT,
    };
    let _ = write!(out, r#"<a:tr h="{row_height}">"#);
    for header in TABLE_HEADERS {
        table_cell(&mut out, header, header_font, Some(HEADER_FILL));
    }
    out.push_str("</a:tr>");

    let body_font = Font {
        size: 10,
        bold: false,
        color: TEXT_DARK,
    };
    for record in records {
        let _ = write!(out, r#"<a:tr h="{row_height}">"#);
        table_cell(&mut out, record.campaign_type(), body_font, None);
        table_cell(&mut out, record.kpi_name(), body_font, None);
        table_cell(&mut out, &format_number(record.benchmark()), body_font, None);
        table_cell(&mut out, &format_number(record.actual()), body_font, None);
        table_cell(&mut out, record.direction().as_str(), body_font, None);
        table_cell(
            &mut out,
            record.status().as_str(),
            Font {
                size: 10,
                bold: true,
                color: TEXT_LIGHT,
            },
            Some(record.status().color_hex()),
        );
        out.push_str("</a:tr>");
    }

    out.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
    out.push_str(SLIDE_CLOSE);
    out
}
