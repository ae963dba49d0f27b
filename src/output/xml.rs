use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use super::{yes_no, REPORT_TIME_FORMAT};
use crate::error::ReportError;
use crate::model::{PluginFinding, ScanResult};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Renders the XML report. Unknown versions and URLs are left out rather
/// than written as empty attributes.
pub(super) fn generate_xml_string(result: &ScanResult) -> Result<String, ReportError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(&mut writer, Event::Start(BytesStart::new("plecost")))?;

    text_element(&mut writer, "target", &result.target.to_string())?;
    text_element(
        &mut writer,
        "start_time",
        &result.start_time.format(REPORT_TIME_FORMAT).to_string(),
    )?;
    text_element(
        &mut writer,
        "end_time",
        &result.end_time.format(REPORT_TIME_FORMAT).to_string(),
    )?;

    let mut wordpress = BytesStart::new("wordpress");
    push_optional(&mut wordpress, "current_version", &result.wordpress_info.current_version);
    push_optional(&mut wordpress, "last_version", &result.wordpress_info.latest_version);
    write(&mut writer, Event::Empty(wordpress))?;

    write(&mut writer, Event::Start(BytesStart::new("plugins")))?;
    for plugin in &result.plugins {
        write_plugin(&mut writer, plugin)?;
    }
    write(&mut writer, Event::End(BytesEnd::new("plugins")))?;

    write(&mut writer, Event::End(BytesEnd::new("plecost")))?;

    String::from_utf8(writer.into_inner().into_inner()).map_err(|e| ReportError::Xml(e.to_string()))
}

fn write_plugin(writer: &mut XmlWriter, plugin: &PluginFinding) -> Result<(), ReportError> {
    let mut element = BytesStart::new("plugin");
    push_optional(&mut element, "current_version", &plugin.current_version);
    push_optional(&mut element, "last_version", &plugin.latest_version);
    push_optional(&mut element, "url", &plugin.plugin_uri);
    element.push_attribute(("outdated", yes_no(plugin.is_outdated)));

    write(writer, Event::Start(element))?;
    write(writer, Event::Text(BytesText::new(&plugin.plugin_name)))?;
    list_element(writer, "cves", "cve", &plugin.cves)?;
    // Items share the container's name; existing readers depend on it.
    list_element(writer, "exploits", "exploits", &plugin.exploits)?;
    write(writer, Event::End(BytesEnd::new("plugin")))
}

/// `<outer><inner>a</inner>...</outer>`, omitted entirely when empty.
fn list_element(
    writer: &mut XmlWriter,
    outer: &str,
    inner: &str,
    items: &[String],
) -> Result<(), ReportError> {
    if items.is_empty() {
        return Ok(());
    }
    write(writer, Event::Start(BytesStart::new(outer)))?;
    for item in items {
        text_element(writer, inner, item)?;
    }
    write(writer, Event::End(BytesEnd::new(outer)))
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), ReportError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn push_optional(element: &mut BytesStart<'_>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        element.push_attribute((key, value.as_str()));
    }
}

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), ReportError> {
    writer
        .write_event(event)
        .map_err(|e| ReportError::Xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentVersion, Target, Vulnerabilities};
    use chrono::{Local, TimeZone};

    fn sample(plugins: Vec<PluginFinding>) -> ScanResult {
        let start = Local.with_ymd_and_hms(2017, 3, 9, 14, 5, 7).unwrap();
        ScanResult::new(
            Target::parse("http://example.com").unwrap(),
            start,
            start,
            ComponentVersion::new("wordpress", Some("4.7".into()), Some("4.9".into())),
            plugins,
        )
    }

    #[test]
    fn test_document_structure() {
        let xml = generate_xml_string(&sample(vec![PluginFinding::new(
            "akismet",
            Some("3.1".into()),
            Some("3.3".into()),
        )
        .with_uri("http://example.com/wp-content/plugins/akismet/readme.txt")
        .with_vulnerabilities(Vulnerabilities {
            cves: vec!["CVE-2017-0001".into()],
            exploits: vec!["EDB-1".into()],
        })]))
        .unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<plecost><target>http://example.com/</target>"));
        assert!(xml.contains("<start_time>14-03-2017 14:05:07</start_time>"));
        assert!(xml.contains(r#"<wordpress current_version="4.7" last_version="4.9"/>"#));
        assert!(xml.contains(
            r#"<plugin current_version="3.1" last_version="3.3" url="http://example.com/wp-content/plugins/akismet/readme.txt" outdated="Yes">akismet"#
        ));
        assert!(xml.contains("<cves><cve>CVE-2017-0001</cve></cves>"));
        assert!(xml.contains("<exploits><exploits>EDB-1</exploits></exploits>"));
        assert!(xml.ends_with("</plugins></plecost>"));
    }

    #[test]
    fn test_unknown_plugin_omits_attributes_and_lists() {
        let xml = generate_xml_string(&sample(vec![PluginFinding::unknown("ghost-plugin", None)]))
            .unwrap();
        assert!(xml.contains(r#"<plugin outdated="No">ghost-plugin</plugin>"#));
        assert!(!xml.contains("<cves>"));
        assert!(!xml.contains("<exploits>"));
    }

    #[test]
    fn test_exploits_written_without_cves() {
        let xml = generate_xml_string(&sample(vec![PluginFinding::new(
            "jetpack",
            Some("4.0".into()),
            Some("5.0".into()),
        )
        .with_vulnerabilities(Vulnerabilities {
            cves: vec![],
            exploits: vec!["EDB-2".into(), "EDB-3".into()],
        })]))
        .unwrap();

        assert!(!xml.contains("<cves>"));
        assert!(xml.contains(
            "jetpack<exploits><exploits>EDB-2</exploits><exploits>EDB-3</exploits></exploits></plugin>"
        ));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = generate_xml_string(&sample(vec![PluginFinding::unknown("a&b<c>", None)]))
            .unwrap();
        assert!(xml.contains("a&amp;b&lt;c&gt;"));
    }
}
