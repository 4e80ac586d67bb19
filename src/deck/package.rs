//! PresentationML package layout: one master, one blank layout and one
//! theme, followed by the generated slides.

use std::fmt::Write as _;
use std::io::{Cursor, Seek, Write};

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::DeckError;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

/// 4:3, 10in x 7.5in
const SLIDE_WIDTH_EMU: u32 = 9_144_000;
const SLIDE_HEIGHT_EMU: u32 = 6_858_000;

const EMPTY_GROUP: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
);

/// Zip the slides into a `.pptx` byte buffer.
pub fn write(title: &str, slides: &[String], created: DateTime<Utc>) -> Result<Vec<u8>, DeckError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    add_part(&mut zip, "[Content_Types].xml", &content_types(slides.len()))?;
    add_part(&mut zip, "_rels/.rels", &root_rels())?;
    add_part(&mut zip, "docProps/core.xml", &core_props(title, created))?;
    add_part(&mut zip, "docProps/app.xml", &app_props(slides.len()))?;
    add_part(&mut zip, "ppt/presentation.xml", &presentation(slides.len()))?;
    add_part(
        &mut zip,
        "ppt/_rels/presentation.xml.rels",
        &presentation_rels(slides.len()),
    )?;
    add_part(&mut zip, "ppt/slideMasters/slideMaster1.xml", &slide_master())?;
    add_part(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &relationships(&[
            ("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
            ("rId2", REL_THEME, "../theme/theme1.xml"),
        ]),
    )?;
    add_part(&mut zip, "ppt/slideLayouts/slideLayout1.xml", &slide_layout())?;
    add_part(
        &mut zip,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &relationships(&[("rId1", REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml")]),
    )?;
    add_part(&mut zip, "ppt/theme/theme1.xml", THEME)?;

    let slide_rels = relationships(&[("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml")]);
    for (index, slide) in slides.iter().enumerate() {
        let number = index + 1;
        add_part(&mut zip, &format!("ppt/slides/slide{number}.xml"), slide)?;
        add_part(
            &mut zip,
            &format!("ppt/slides/_rels/slide{number}.xml.rels"),
            &slide_rels,
        )?;
    }

    Ok(zip.finish()?.into_inner())
}

fn add_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, body: &str) -> Result<(), DeckError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(name, options)?;
    zip.write_all(body.as_bytes())?;
    debug!(part = name, bytes = body.len(), "wrote package part");
    Ok(())
}

fn content_types(slide_count: usize) -> String {
    let mut out = String::from(XML_DECL);
    out.push_str(concat!(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
        r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#,
        r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
        r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#,
        r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
        r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
    ));
    for number in 1..=slide_count {
        let _ = write!(
            out,
            r#"<Override PartName="/ppt/slides/slide{number}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        );
    }
    out.push_str("</Types>");
    out
}

fn root_rels() -> String {
    relationships(&[
        (
            "rId1",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument",
            "ppt/presentation.xml",
        ),
        (
            "rId2",
            "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
            "docProps/core.xml",
        ),
        (
            "rId3",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties",
            "docProps/app.xml",
        ),
    ])
}

fn relationships(entries: &[(&str, &str, &str)]) -> String {
    let mut out = String::from(XML_DECL);
    let _ = write!(out, r#"<Relationships xmlns="{NS_PKG_REL}">"#);
    for (id, kind, target) in entries {
        let _ = write!(
            out,
            r#"<Relationship Id="{id}" Type="{kind}" Target="{target}"/>"#
        );
    }
    out.push_str("</Relationships>");
    out
}

fn core_props(title: &str, created: DateTime<Utc>) -> String {
    let stamp = created.format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        concat!(
            "{decl}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{title}</dc:title><dc:creator>kpi-deck</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{stamp}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{stamp}</dcterms:modified>"#,
            "</cp:coreProperties>",
        ),
        decl = XML_DECL,
        title = escape(title),
        stamp = stamp,
    )
}

fn app_props(slide_count: usize) -> String {
    format!(
        concat!(
            "{decl}",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>kpi-deck</Application><PresentationFormat>On-screen Show (4:3)</PresentationFormat>",
            "<Slides>{slides}</Slides></Properties>",
        ),
        decl = XML_DECL,
        slides = slide_count,
    )
}

fn presentation(slide_count: usize) -> String {
    let mut out = String::from(XML_DECL);
    let _ = write!(
        out,
        r#"<p:presentation xmlns:a="{NS_DRAWING}" xmlns:r="{NS_REL}" xmlns:p="{NS_MAIN}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>"#
    );
    // rId1 is the master and rId2 the theme, so slide N is rId(N + 2).
    for number in 1..=slide_count {
        let _ = write!(
            out,
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            255 + number,
            number + 2
        );
    }
    let _ = write!(
        out,
        r#"</p:sldIdLst><p:sldSz cx="{SLIDE_WIDTH_EMU}" cy="{SLIDE_HEIGHT_EMU}" type="screen4x3"/><p:notesSz cx="{SLIDE_HEIGHT_EMU}" cy="{SLIDE_WIDTH_EMU}"/><p:defaultTextStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:defaultTextStyle></p:presentation>"#
    );
    out
}

fn presentation_rels(slide_count: usize) -> String {
    let mut entries: Vec<(String, &str, String)> = vec![
        (
            "rId1".to_string(),
            REL_SLIDE_MASTER,
            "slideMasters/slideMaster1.xml".to_string(),
        ),
        ("rId2".to_string(), REL_THEME, "theme/theme1.xml".to_string()),
    ];
    for number in 1..=slide_count {
        entries.push((
            format!("rId{}", number + 2),
            REL_SLIDE,
            format!("slides/slide{number}.xml"),
        ));
    }
    let borrowed: Vec<(&str, &str, &str)> = entries
        .iter()
        .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
        .collect();
    relationships(&borrowed)
}

fn slide_master() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldMaster xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#,
            "<p:spTree>{group}</p:spTree></p:cSld>",
            r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
            r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#,
            r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#,
            "<p:txStyles>",
            r#"<p:titleStyle><a:lvl1pPr><a:defRPr sz="4400"/></a:lvl1pPr></p:titleStyle>"#,
            r#"<p:bodyStyle><a:lvl1pPr><a:defRPr sz="2400"/></a:lvl1pPr></p:bodyStyle>"#,
            r#"<p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"/></a:lvl1pPr></p:otherStyle>"#,
            "</p:txStyles></p:sldMaster>",
        ),
        decl = XML_DECL,
        a = NS_DRAWING,
        r = NS_REL,
        p = NS_MAIN,
        group = EMPTY_GROUP,
    )
}

fn slide_layout() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<p:sldLayout xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" type="blank" preserve="1">"#,
            r#"<p:cSld name="Blank"><p:spTree>{group}</p:spTree></p:cSld>"#,
            "<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>",
        ),
        decl = XML_DECL,
        a = NS_DRAWING,
        r = NS_REL,
        p = NS_MAIN,
        group = EMPTY_GROUP,
    )
}

const THEME: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="KPI Deck">"#,
    "<a:themeElements>",
    r#"<a:clrScheme name="KPI Deck">"#,
    r#"<a:dk1><a:srgbClr val="000000"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="333333"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink>"#,
    "</a:clrScheme>",
    r#"<a:fontScheme name="KPI Deck">"#,
    r#"<a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
    "</a:fontScheme>",
    r#"<a:fmtScheme name="KPI Deck">"#,
    "<a:fillStyleLst>",
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    "</a:fillStyleLst>",
    "<a:lnStyleLst>",
    r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    "</a:lnStyleLst>",
    "<a:effectStyleLst>",
    "<a:effectStyle><a:effectLst/></a:effectStyle>",
    "<a:effectStyle><a:effectLst/></a:effectStyle>",
    "<a:effectStyle><a:effectLst/></a:effectStyle>",
    "</a:effectStyleLst>",
    "<a:bgFillStyleLst>",
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    "</a:bgFillStyleLst>",
    "</a:fmtScheme>",
    "</a:themeElements>",
    "<a:objectDefaults/><a:extraClrSchemeLst/>",
    "</a:theme>",
);
