//! DOCX 렌더링
//!
//! 블록 목록을 WordprocessingML 로 쓰고 zip 패키지로 묶는다.
//! 패키지 항목의 수정 시각은 고정값이라 같은 블록은 같은 바이트가 된다.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::ExportError;
use crate::services::export::layout::ExportBlock;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const EXAMPLE_FILL: &str = "F1F5F9";
const EXAMPLE_BORDER: &str = "CBD5E1";
const ANSWER_COLOR: &str = "008000";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Malgun Gothic" w:eastAsia="Malgun Gothic" w:hAnsi="Malgun Gothic"/><w:sz w:val="22"/><w:lang w:eastAsia="ko-KR"/></w:rPr></w:rPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:rPr><w:b/><w:sz w:val="48"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="30"/></w:rPr></w:style></w:styles>"#;

fn serialization<E: std::fmt::Display>(e: E) -> ExportError {
    ExportError::Serialization {
        reason: e.to_string(),
    }
}

/// 글자 조각의 서식
#[derive(Debug, Clone, Copy, Default)]
struct RunStyle {
    bold: bool,
    italic: bool,
    color: Option<&'static str>,
}

impl RunStyle {
    const PLAIN: RunStyle = RunStyle {
        bold: false,
        italic: false,
        color: None,
    };
    const BOLD: RunStyle = RunStyle {
        bold: true,
        italic: false,
        color: None,
    };
}

/// 단락 속성
#[derive(Debug, Clone, Copy, Default)]
struct ParagraphStyle {
    style_id: Option<&'static str>,
    before: Option<u32>,
    after: Option<u32>,
}

/// 단락 구성 요소
enum Piece<'a> {
    Text(&'a str, RunStyle),
    Break,
}

struct DocumentWriter {
    writer: Writer<Vec<u8>>,
}

impl DocumentWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        self.writer.write_event(event).map_err(serialization)
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        let mut element = BytesStart::new(name);
        for attr in attrs {
            element.push_attribute(*attr);
        }
        self.event(Event::Start(element))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), ExportError> {
        let mut element = BytesStart::new(name);
        for attr in attrs {
            element.push_attribute(*attr);
        }
        self.event(Event::Empty(element))
    }

    fn end(&mut self, name: &str) -> Result<(), ExportError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn run(&mut self, text: &str, style: RunStyle) -> Result<(), ExportError> {
        self.start("w:r", &[])?;
        if style.bold || style.italic || style.color.is_some() {
            self.start("w:rPr", &[])?;
            if style.bold {
                self.empty("w:b", &[])?;
            }
            if style.italic {
                self.empty("w:i", &[])?;
            }
            if let Some(color) = style.color {
                self.empty("w:color", &[("w:val", color)])?;
            }
            self.end("w:rPr")?;
        }
        self.start("w:t", &[("xml:space", "preserve")])?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end("w:t")?;
        self.end("w:r")
    }

    fn paragraph(&mut self, style: ParagraphStyle, pieces: &[Piece<'_>]) -> Result<(), ExportError> {
        self.start("w:p", &[])?;
        if style.style_id.is_some() || style.before.is_some() || style.after.is_some() {
            self.start("w:pPr", &[])?;
            if let Some(id) = style.style_id {
                self.empty("w:pStyle", &[("w:val", id)])?;
            }
            if style.before.is_some() || style.after.is_some() {
                let before = style.before.map(|v| v.to_string());
                let after = style.after.map(|v| v.to_string());
                let mut attrs = Vec::new();
                if let Some(before) = before.as_deref() {
                    attrs.push(("w:before", before));
                }
                if let Some(after) = after.as_deref() {
                    attrs.push(("w:after", after));
                }
                self.empty("w:spacing", &attrs)?;
            }
            self.end("w:pPr")?;
        }
        for piece in pieces {
            match piece {
                Piece::Text(text, run_style) => self.run(text, *run_style)?,
                Piece::Break => {
                    self.start("w:r", &[])?;
                    self.empty("w:br", &[])?;
                    self.end("w:r")?;
                }
            }
        }
        self.end("w:p")
    }

    fn example_box(&mut self, lines: &[String]) -> Result<(), ExportError> {
        let border = [
            ("w:val", "single"),
            ("w:sz", "6"),
            ("w:space", "0"),
            ("w:color", EXAMPLE_BORDER),
        ];
        let margin = [("w:w", "140"), ("w:type", "dxa")];
        let spaced = ParagraphStyle {
            after: Some(100),
            ..Default::default()
        };

        self.start("w:tbl", &[])?;
        self.start("w:tblPr", &[])?;
        self.empty("w:tblW", &[("w:w", "5000"), ("w:type", "pct")])?;
        self.end("w:tblPr")?;
        self.start("w:tblGrid", &[])?;
        self.empty("w:gridCol", &[("w:w", "9026")])?;
        self.end("w:tblGrid")?;
        self.start("w:tr", &[])?;
        self.start("w:tc", &[])?;

        self.start("w:tcPr", &[])?;
        self.empty("w:tcW", &[("w:w", "5000"), ("w:type", "pct")])?;
        self.start("w:tcBorders", &[])?;
        for side in ["w:top", "w:left", "w:bottom", "w:right"] {
            self.empty(side, &border)?;
        }
        self.end("w:tcBorders")?;
        self.empty(
            "w:shd",
            &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", EXAMPLE_FILL)],
        )?;
        self.start("w:tcMar", &[])?;
        for side in ["w:top", "w:left", "w:bottom", "w:right"] {
            self.empty(side, &margin)?;
        }
        self.end("w:tcMar")?;
        self.end("w:tcPr")?;

        self.paragraph(spaced, &[Piece::Text("<보기>", RunStyle::BOLD)])?;
        for line in lines {
            self.paragraph(spaced, &[Piece::Text(line, RunStyle::PLAIN)])?;
        }

        self.end("w:tc")?;
        self.end("w:tr")?;
        self.end("w:tbl")
    }

    fn block(&mut self, block: &ExportBlock) -> Result<(), ExportError> {
        match block {
            ExportBlock::Title(title) => self.paragraph(
                ParagraphStyle {
                    style_id: Some("Title"),
                    after: Some(400),
                    ..Default::default()
                },
                &[Piece::Text(title, RunStyle::PLAIN)],
            ),
            ExportBlock::Body(line) => self.paragraph(
                ParagraphStyle {
                    after: Some(200),
                    ..Default::default()
                },
                &[Piece::Text(line, RunStyle::PLAIN)],
            ),
            ExportBlock::SectionHeading(heading) => self.paragraph(
                ParagraphStyle {
                    style_id: Some("Heading2"),
                    before: Some(400),
                    after: Some(200),
                },
                &[Piece::Text(heading, RunStyle::PLAIN)],
            ),
            ExportBlock::VocabularyEntry { word, definition } => {
                let definition = format!(": {}", definition);
                self.paragraph(
                    ParagraphStyle::default(),
                    &[
                        Piece::Text(word, RunStyle::BOLD),
                        Piece::Text(&definition, RunStyle::PLAIN),
                    ],
                )
            }
            ExportBlock::VocabularyExample(example) => self.paragraph(
                ParagraphStyle {
                    after: Some(200),
                    ..Default::default()
                },
                &[Piece::Text(
                    example,
                    RunStyle {
                        italic: true,
                        ..RunStyle::PLAIN
                    },
                )],
            ),
            ExportBlock::QuestionLead(lines) => {
                let mut pieces = Vec::with_capacity(lines.len() * 2);
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        pieces.push(Piece::Break);
                    }
                    pieces.push(Piece::Text(line, RunStyle::BOLD));
                }
                self.paragraph(
                    ParagraphStyle {
                        after: Some(100),
                        ..Default::default()
                    },
                    &pieces,
                )
            }
            ExportBlock::ExampleBox(lines) => self.example_box(lines),
            ExportBlock::Choice(line) => {
                self.paragraph(ParagraphStyle::default(), &[Piece::Text(line, RunStyle::PLAIN)])
            }
            ExportBlock::Answer(line) => self.paragraph(
                ParagraphStyle::default(),
                &[Piece::Text(
                    line,
                    RunStyle {
                        bold: true,
                        color: Some(ANSWER_COLOR),
                        ..RunStyle::PLAIN
                    },
                )],
            ),
            ExportBlock::Blank => self.paragraph(ParagraphStyle::default(), &[]),
        }
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// `word/document.xml` 본문
pub fn document_xml(blocks: &[ExportBlock]) -> Result<Vec<u8>, ExportError> {
    let mut doc = DocumentWriter::new();
    doc.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    doc.start("w:document", &[("xmlns:w", W_NS), ("xmlns:r", R_NS)])?;
    doc.start("w:body", &[])?;

    for block in blocks {
        doc.block(block)?;
    }

    doc.start("w:sectPr", &[])?;
    doc.empty("w:pgSz", &[("w:w", "11906"), ("w:h", "16838")])?;
    doc.empty(
        "w:pgMar",
        &[
            ("w:top", "1440"),
            ("w:right", "1440"),
            ("w:bottom", "1440"),
            ("w:left", "1440"),
            ("w:header", "708"),
            ("w:footer", "708"),
            ("w:gutter", "0"),
        ],
    )?;
    doc.end("w:sectPr")?;

    doc.end("w:body")?;
    doc.end("w:document")?;
    Ok(doc.finish())
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
}

/// 블록 목록을 DOCX 패키지 바이트로 렌더링
pub fn render(blocks: &[ExportBlock]) -> Result<Vec<u8>, ExportError> {
    let document = document_xml(blocks)?;
    let parts: [(&str, &[u8]); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
        ("word/styles.xml", STYLES.as_bytes()),
        ("word/document.xml", &document),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in parts {
        zip.start_file(name, entry_options()).map_err(serialization)?;
        zip.write_all(bytes).map_err(serialization)?;
    }
    let cursor = zip.finish().map_err(serialization)?;
    Ok(cursor.into_inner())
}
