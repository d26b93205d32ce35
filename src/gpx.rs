use crate::map::{MapSurface, Marker};
use crate::types::Coords;
use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;
use std::fs;
use std::path::Path;

/// Map surface that keeps markers as GPX waypoints.
///
/// There is nothing to look at, so the current view is only remembered.
#[derive(Debug, Default, Clone)]
pub struct GpxMap {
    markers: Vec<Marker>,
    view: Option<(Coords, u8)>,
}

impl GpxMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub const fn view(&self) -> Option<(Coords, u8)> {
        self.view
    }

    /// Serializes every marker as a `<wpt>` of a GPX 1.1 document.
    pub fn to_gpx(&self) -> Result<String> {
        let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut root = BytesStart::new("gpx");
        root.push_attribute(("version", "1.1"));
        root.push_attribute(("creator", "mapty"));
        root.push_attribute(("xmlns", "http://www.topografix.com/GPX/1/1"));
        xml.write_event(Event::Start(root))?;

        for m in &self.markers {
            let lat = m.coords.lat.to_string();
            let lon = m.coords.lng.to_string();
            let mut wpt = BytesStart::new("wpt");
            wpt.push_attribute(("lat", lat.as_str()));
            wpt.push_attribute(("lon", lon.as_str()));
            xml.write_event(Event::Start(wpt))?;

            write_text_element(&mut xml, "name", &m.popup)?;
            if !m.class.is_empty() {
                write_text_element(&mut xml, "type", &m.class)?;
            }

            xml.write_event(Event::End(BytesEnd::new("wpt")))?;
        }

        xml.write_event(Event::End(BytesEnd::new("gpx")))?;
        String::from_utf8(xml.into_inner()).context("GPX output is not UTF-8")
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let doc = self.to_gpx()?;
        fs::write(path, doc).with_context(|| format!("writing GPX: {}", path.display()))?;
        tracing::info!(path = %path.display(), waypoints = self.markers.len(), "wrote GPX");
        Ok(())
    }
}

fn write_text_element(xml: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

impl MapSurface for GpxMap {
    fn center_view(&mut self, coords: Coords, zoom: u8) {
        self.view = Some((coords, zoom));
    }

    fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    fn remove_marker(&mut self, id: &str) {
        self.markers.retain(|m| m.id != id);
    }
}
