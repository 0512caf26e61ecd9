//! OME-XML serialisation of a metadata model
//!
//! The document is embedded in the first IFD's `ImageDescription`. TIFF ASCII
//! fields cannot hold anything but 7-bit text, so non-ASCII characters in names
//! and labels are written as numeric character references.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::ome_export::common::error::{ExportError, Result};
use crate::ome_export::metadata::identifiers;
use crate::ome_export::metadata::{Image, MetadataModel, ModuloAnnotation, Plate};

pub const OME_NAMESPACE: &str = "http://www.openmicroscopy.org/Schemas/OME/2016-06";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const OME_SCHEMA_LOCATION: &str = "http://www.openmicroscopy.org/Schemas/OME/2016-06 \
                                   http://www.openmicroscopy.org/Schemas/OME/2016-06/ome.xsd";
pub const MODULO_NAMESPACE: &str = "openmicroscopy.org/omero/dimension/modulo";
const MODULO_ADDITIONS_NAMESPACE: &str = "http://www.openmicroscopy.org/Schemas/Additions/2011-09";

/// Renders `model` as an OME-XML document.
///
/// Planes are assumed to be stored one per IFD in series order, so series `n`
/// starts at the IFD following the last plane of series `n - 1`.
pub fn render(model: &MetadataModel, uuid: &str) -> Result<String> {
    let mut doc = XmlDocument::new();

    doc.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    doc.start(
        "OME",
        &[
            ("xmlns", OME_NAMESPACE.to_string()),
            ("xmlns:xsi", XSI_NAMESPACE.to_string()),
            ("xsi:schemaLocation", OME_SCHEMA_LOCATION.to_string()),
            ("UUID", uuid.to_string()),
            (
                "Creator",
                format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            ),
        ],
    )?;

    if let Some(plate) = model.plate() {
        write_plate(&mut doc, plate)?;
    }

    let mut first_ifd = 0;
    for image in model.images() {
        write_image(&mut doc, image, first_ifd)?;
        first_ifd += image.plane_count();
    }

    let annotated: Vec<(&Image, &ModuloAnnotation)> = model
        .images()
        .iter()
        .filter_map(|image| image.modulo.as_ref().map(|modulo| (image, modulo)))
        .collect();
    if !annotated.is_empty() {
        doc.start("StructuredAnnotations", &[])?;
        for (image, modulo) in annotated {
            write_modulo(&mut doc, image.series, modulo)?;
        }
        doc.end("StructuredAnnotations")?;
    }

    doc.end("OME")?;
    doc.finish()
}

fn write_plate(doc: &mut XmlDocument, plate: &Plate) -> Result<()> {
    doc.start(
        "Plate",
        &[
            ("ID", plate.id.clone()),
            ("Name", plate.name.clone()),
            ("RowNamingConvention", plate.row_naming.as_str().to_string()),
            ("ColumnNamingConvention", plate.column_naming.as_str().to_string()),
            ("Rows", plate.rows.to_string()),
            ("Columns", plate.columns.to_string()),
        ],
    )?;

    if let Some(description) = &plate.description {
        doc.text_element("Description", description)?;
    }

    for well in &plate.wells {
        let attributes = [
            ("ID", well.id.clone()),
            ("Row", well.row.to_string()),
            ("Column", well.column.to_string()),
        ];
        if well.samples.is_empty() {
            doc.empty("Well", &attributes)?;
            continue;
        }

        doc.start("Well", &attributes)?;
        for sample in &well.samples {
            doc.start(
                "WellSample",
                &[
                    ("ID", sample.id.clone()),
                    ("Index", sample.sequence_index.to_string()),
                ],
            )?;
            doc.empty("ImageRef", &[("ID", sample.image_ref.clone())])?;
            doc.end("WellSample")?;
        }
        doc.end("Well")?;
    }

    doc.end("Plate")
}

fn write_image(doc: &mut XmlDocument, image: &Image, first_ifd: usize) -> Result<()> {
    let pixels = &image.pixels;

    doc.start("Image", &[("ID", image.id.clone()), ("Name", image.name.clone())])?;

    if let Some(description) = &image.description {
        doc.text_element("Description", description)?;
    }

    doc.start(
        "Pixels",
        &[
            ("ID", pixels.id.clone()),
            ("DimensionOrder", pixels.dimension_order.as_str().to_string()),
            ("Type", pixels.pixel_type.as_str().to_string()),
            ("SizeX", pixels.size_x.to_string()),
            ("SizeY", pixels.size_y.to_string()),
            ("SizeZ", pixels.size_z.to_string()),
            ("SizeC", pixels.size_c.to_string()),
            ("SizeT", pixels.size_t.to_string()),
            ("BigEndian", pixels.big_endian.to_string()),
        ],
    )?;

    for channel in &pixels.channels {
        doc.empty(
            "Channel",
            &[
                ("ID", channel.id.clone()),
                ("SamplesPerPixel", channel.samples_per_pixel.to_string()),
            ],
        )?;
    }

    doc.empty(
        "TiffData",
        &[
            ("IFD", first_ifd.to_string()),
            ("PlaneCount", image.plane_count().to_string()),
        ],
    )?;

    for plane in &pixels.planes {
        let mut attributes = vec![
            ("TheZ", plane.the_z.to_string()),
            ("TheC", plane.the_c.to_string()),
            ("TheT", plane.the_t.to_string()),
        ];
        if let Some(seconds) = plane.exposure_time {
            attributes.push(("ExposureTime", seconds.to_string()));
            attributes.push(("ExposureTimeUnit", "s".to_string()));
        }
        doc.empty("Plane", &attributes)?;
    }

    doc.end("Pixels")?;

    if image.modulo.is_some() {
        doc.empty(
            "AnnotationRef",
            &[("ID", identifiers::modulo_annotation_id(image.series))],
        )?;
    }

    doc.end("Image")
}

fn write_modulo(doc: &mut XmlDocument, series: usize, modulo: &ModuloAnnotation) -> Result<()> {
    doc.start(
        "XMLAnnotation",
        &[
            ("ID", identifiers::modulo_annotation_id(series)),
            ("Namespace", MODULO_NAMESPACE.to_string()),
        ],
    )?;
    doc.start("Value", &[])?;
    doc.start("Modulo", &[("namespace", MODULO_ADDITIONS_NAMESPACE.to_string())])?;

    let axis = modulo.axis.element_name();
    doc.start(
        axis,
        &[
            ("Type", modulo.modulo_type.clone()),
            ("TypeDescription", modulo.type_description.clone()),
            ("Unit", modulo.unit.clone()),
        ],
    )?;
    for label in &modulo.labels {
        doc.text_element("Label", label)?;
    }
    doc.end(axis)?;

    doc.end("Modulo")?;
    doc.end("Value")?;
    doc.end("XMLAnnotation")
}

struct XmlDocument {
    writer: Writer<Vec<u8>>,
}

impl XmlDocument {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| ExportError::EncoderBinding(format!("OME-XML serialisation failed: {e}")))
    }

    fn start(&mut self, name: &str, attributes: &[(&str, String)]) -> Result<()> {
        self.emit(Event::Start(element(name, attributes)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, String)]) -> Result<()> {
        self.emit(Event::Empty(element(name, attributes)))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name, &[])?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn finish(self) -> Result<String> {
        let xml = String::from_utf8(self.writer.into_inner())
            .map_err(|e| ExportError::EncoderBinding(format!("OME-XML is not UTF-8: {e}")))?;
        Ok(escape_non_ascii(xml))
    }
}

fn element<'a>(name: &'a str, attributes: &[(&str, String)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (key, value) in attributes {
        start.push_attribute((*key, value.as_str()));
    }
    start
}

fn escape_non_ascii(xml: String) -> String {
    if xml.is_ascii() {
        return xml;
    }
    let mut escaped = String::with_capacity(xml.len() + 16);
    for c in xml.chars() {
        if c.is_ascii() {
            escaped.push(c);
        } else {
            escaped.push_str(&format!("&#x{:X};", u32::from(c)));
        }
    }
    escaped
}
