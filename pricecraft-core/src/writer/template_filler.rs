// ! XLSX template filling via streaming rewrite of the worksheet XML

use super::{COL_SKU, COLS_PRICE, START_ROW};
use crate::error::TemplateError;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Write};
use std::path::Path;
use zip::{ZipArchive, ZipWriter, write::FileOptions};

/// Fill an XLSX template by rewriting its first worksheet part.
///
/// The template rows at and below the data start row are dropped (stale data
/// from a previous fill must not survive), the validated rows are appended
/// before `</sheetData>`, and every other archive entry is copied unchanged
/// so the template's formatting, shared strings and styles are preserved.
pub fn fill_template_xlsx(
    input_path: &Path,
    output_path: &Path,
    rows: &[(String, f64)],
) -> Result<(), TemplateError> {
    let file = File::open(input_path)?;
    let reader = BufReader::new(file);
    let mut archive = ZipArchive::new(reader)?;

    let workbook_xml = read_file_from_zip(&mut archive, "xl/workbook.xml")
        .map_err(|_| TemplateError::Invalid("missing xl/workbook.xml".to_string()))?;
    let sheet_id = parse_first_sheet_id(&workbook_xml)?;
    let sheet_part = format!("xl/worksheets/sheet{}.xml", sheet_id);

    if archive.by_name(&sheet_part).is_err() {
        return Err(TemplateError::MissingSheet(sheet_part));
    }

    let output_file = File::create(output_path)?;
    let mut zip_writer = ZipWriter::new(output_file);

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_string();

        if name == sheet_part {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            let filled = fill_sheet_xml(&content, rows)?;
            zip_writer.start_file(name.as_str(), FileOptions::<()>::default())?;
            zip_writer.write_all(filled.as_bytes())?;
        } else {
            // Copy entry as is
            zip_writer.start_file(name.as_str(), FileOptions::<()>::default())?;
            let mut buffer = Vec::new();
            file.read_to_end(&mut buffer)?;
            zip_writer.write_all(&buffer)?;
        }
    }

    zip_writer.finish()?;
    Ok(())
}

fn read_file_from_zip(
    archive: &mut ZipArchive<BufReader<File>>,
    filename: &str,
) -> Result<String, TemplateError> {
    let mut file = archive.by_name(filename)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

/// First `sheetId` declared in workbook.xml; the worksheet part is named
/// after it.
fn parse_first_sheet_id(workbook_xml: &str) -> Result<usize, TemplateError> {
    let mut reader = Reader::from_str(workbook_xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"sheet" => {
                for attr in e.attributes() {
                    let attr = attr.map_err(|e| TemplateError::Invalid(e.to_string()))?;
                    if attr.key.as_ref() == b"sheetId" {
                        let id = String::from_utf8_lossy(&attr.value)
                            .parse::<usize>()
                            .map_err(|e| TemplateError::Invalid(e.to_string()))?;
                        return Ok(id);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TemplateError::Invalid(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Err(TemplateError::MissingSheet("<first worksheet>".to_string()))
}

/// Rewrite one worksheet XML: drop template rows with `r >= START_ROW` and
/// append the generated data rows before `</sheetData>`.
fn fill_sheet_xml(xml: &str, rows: &[(String, f64)]) -> Result<String, TemplateError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();
    let mut skip_current_row = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"row" => {
                if row_number(&e)? >= START_ROW {
                    skip_current_row = true;
                } else {
                    write_event(&mut writer, Event::Start(e))?;
                }
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"row" => {
                if row_number(&e)? < START_ROW {
                    write_event(&mut writer, Event::Empty(e))?;
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"row" => {
                if skip_current_row {
                    skip_current_row = false;
                } else {
                    write_event(&mut writer, Event::End(e))?;
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"sheetData" => {
                write_data_rows(&mut writer, rows)?;
                write_event(&mut writer, Event::End(e))?;
            }
            // A template with no rows at all serializes as <sheetData/>
            Ok(Event::Empty(e)) if e.name().as_ref() == b"sheetData" => {
                write_event(&mut writer, Event::Start(e))?;
                write_data_rows(&mut writer, rows)?;
                write_event(&mut writer, Event::End(BytesEnd::new("sheetData")))?;
            }
            Ok(Event::Eof) => break,
            Ok(e) => {
                if !skip_current_row {
                    write_event(&mut writer, e)?;
                }
            }
            Err(e) => return Err(TemplateError::Invalid(e.to_string())),
        }
        buf.clear();
    }

    let result = writer.into_inner().into_inner();
    String::from_utf8(result).map_err(|e| TemplateError::Invalid(e.to_string()))
}

/// The `r` attribute of a row element; rows without one never occur in the
/// template area we rewrite, treat them as header rows.
fn row_number(e: &BytesStart<'_>) -> Result<u32, TemplateError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| TemplateError::Invalid(e.to_string()))?;
        if attr.key.as_ref() == b"r" {
            return String::from_utf8_lossy(&attr.value)
                .parse::<u32>()
                .map_err(|e| TemplateError::Invalid(e.to_string()));
        }
    }
    Ok(0)
}

fn write_data_rows<W: Write>(
    writer: &mut Writer<W>,
    rows: &[(String, f64)],
) -> Result<(), TemplateError> {
    for (i, (sku, price)) in rows.iter().enumerate() {
        let row = START_ROW + i as u32;
        let row_str = row.to_string();

        let mut row_el = BytesStart::new("row");
        row_el.push_attribute(("r", row_str.as_str()));
        write_event(writer, Event::Start(row_el))?;

        write_inline_str_cell(writer, COL_SKU, row, sku)?;
        for col in COLS_PRICE {
            write_number_cell(writer, col, row, *price)?;
        }

        write_event(writer, Event::End(BytesEnd::new("row")))?;
    }
    Ok(())
}

fn write_inline_str_cell<W: Write>(
    writer: &mut Writer<W>,
    col: &str,
    row: u32,
    value: &str,
) -> Result<(), TemplateError> {
    let cell_ref = format!("{col}{row}");
    let mut c = BytesStart::new("c");
    c.push_attribute(("r", cell_ref.as_str()));
    c.push_attribute(("t", "inlineStr"));
    write_event(writer, Event::Start(c))?;
    write_event(writer, Event::Start(BytesStart::new("is")))?;
    write_event(writer, Event::Start(BytesStart::new("t")))?;
    write_event(writer, Event::Text(BytesText::new(value)))?;
    write_event(writer, Event::End(BytesEnd::new("t")))?;
    write_event(writer, Event::End(BytesEnd::new("is")))?;
    write_event(writer, Event::End(BytesEnd::new("c")))?;
    Ok(())
}

fn write_number_cell<W: Write>(
    writer: &mut Writer<W>,
    col: &str,
    row: u32,
    value: f64,
) -> Result<(), TemplateError> {
    let cell_ref = format!("{col}{row}");
    let mut c = BytesStart::new("c");
    c.push_attribute(("r", cell_ref.as_str()));
    write_event(writer, Event::Start(c))?;
    write_event(writer, Event::Start(BytesStart::new("v")))?;
    write_event(writer, Event::Text(BytesText::new(&value.to_string())))?;
    write_event(writer, Event::End(BytesEnd::new("v")))?;
    write_event(writer, Event::End(BytesEnd::new("c")))?;
    Ok(())
}

fn write_event<'a, W: Write>(
    writer: &mut Writer<W>,
    event: Event<'a>,
) -> Result<(), TemplateError> {
    writer
        .write_event(event)
        .map_err(|e| TemplateError::Invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Bulk Price Upload</t></is></c></row>
<row r="7"><c r="D7" t="inlineStr"><is><t>STALE-SKU</t></is></c><c r="E7"><v>1</v></c></row>
<row r="8"><c r="D8" t="inlineStr"><is><t>STALE-2</t></is></c></row>
</sheetData></worksheet>"#;

    #[test]
    fn test_fill_sheet_xml_writes_data_rows() {
        let rows = vec![("A-1".to_string(), 12.5), ("B-2".to_string(), 7.0)];
        let out = fill_sheet_xml(SHEET_XML, &rows).unwrap();

        assert!(out.contains(r#"<c r="D7" t="inlineStr"><is><t>A-1</t></is></c>"#));
        assert!(out.contains(r#"<c r="E7"><v>12.5</v></c>"#));
        assert!(out.contains(r#"<c r="F7"><v>12.5</v></c>"#));
        assert!(out.contains(r#"<c r="G7"><v>12.5</v></c>"#));
        assert!(out.contains(r#"<c r="D8" t="inlineStr"><is><t>B-2</t></is></c>"#));
        assert!(out.contains(r#"<c r="E8"><v>7</v></c>"#));
    }

    #[test]
    fn test_fill_sheet_xml_clears_stale_rows() {
        let out = fill_sheet_xml(SHEET_XML, &[("A-1".to_string(), 2.0)]).unwrap();
        assert!(!out.contains("STALE-SKU"));
        assert!(!out.contains("STALE-2"));
        assert!(!out.contains(r#"<row r="8">"#));
    }

    #[test]
    fn test_fill_sheet_xml_keeps_header_rows() {
        let out = fill_sheet_xml(SHEET_XML, &[]).unwrap();
        assert!(out.contains("Bulk Price Upload"));
        assert!(out.contains(r#"<row r="1">"#));
    }

    #[test]
    fn test_sku_text_is_escaped() {
        let out = fill_sheet_xml(SHEET_XML, &[("A<1>&".to_string(), 1.0)]).unwrap();
        assert!(out.contains("A&lt;1&gt;&amp;"));
    }

    #[test]
    fn test_parse_first_sheet_id() {
        let xml = r#"<workbook><sheets><sheet name="Prices" sheetId="3" r:id="rId1"/></sheets></workbook>"#;
        assert_eq!(parse_first_sheet_id(xml).unwrap(), 3);
        assert!(parse_first_sheet_id("<workbook><sheets/></workbook>").is_err());
    }
}
