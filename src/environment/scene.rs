//! Scene file reader.
//!
//! A scene is an `<Environment>` document listing robots, either inline or as
//! `<Robot file="...">` includes resolved against the scene's directory. A
//! bare `<Robot>` document is also accepted as a one-robot scene.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::definition::{
    empty_robot, get_attribute_opt, is_tag, lower_name, parse_robot, parse_robot_str,
    skip_element, RobotDefinition,
};
use super::error::{DefinitionError, DefinitionResult};

/// Parse scene XML. Includes are resolved relative to `base_dir`.
pub fn parse_scene_str(xml: &str, base_dir: &Path) -> DefinitionResult<Vec<RobotDefinition>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) if is_tag(e.name(), b"environment") => {
                return parse_environment(&mut reader, base_dir);
            }
            Event::Empty(ref e) if is_tag(e.name(), b"environment") => return Ok(Vec::new()),
            Event::Start(ref e) if is_tag(e.name(), b"robot") => {
                let start = e.to_owned();
                return Ok(vec![robot_entry(&mut reader, &start, base_dir)?]);
            }
            Event::Empty(ref e) if is_tag(e.name(), b"robot") => {
                let start = e.to_owned();
                return Ok(vec![robot_include_or_empty(&start, base_dir)?]);
            }
            Event::Start(_) | Event::Empty(_) | Event::Eof => {
                return Err(DefinitionError::missing_element("Environment", "scene document"));
            }
            _ => {}
        }
        buf.clear();
    }
}

fn parse_environment(
    reader: &mut Reader<&[u8]>,
    base_dir: &Path,
) -> DefinitionResult<Vec<RobotDefinition>> {
    let mut robots = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag = lower_name(e.name());
                if tag == b"robot" {
                    let start = e.to_owned();
                    robots.push(robot_entry(reader, &start, base_dir)?);
                } else {
                    skip_element(reader, &tag)?;
                }
            }
            Event::Empty(ref e) if is_tag(e.name(), b"robot") => {
                let start = e.to_owned();
                robots.push(robot_include_or_empty(&start, base_dir)?);
            }
            Event::End(ref e) if is_tag(e.name(), b"environment") => break,
            Event::Eof => return Err(DefinitionError::Xml("unexpected EOF in Environment".into())),
            _ => {}
        }
        buf.clear();
    }

    Ok(robots)
}

/// A `<Robot>` start tag: an include (whose body is ignored) or an inline robot.
fn robot_entry(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    base_dir: &Path,
) -> DefinitionResult<RobotDefinition> {
    if get_attribute_opt(start, "file").is_some() {
        skip_element(reader, b"robot")?;
        return robot_include_or_empty(start, base_dir);
    }
    parse_robot(reader, start, None)
}

fn robot_include_or_empty(start: &BytesStart, base_dir: &Path) -> DefinitionResult<RobotDefinition> {
    let name_override = get_attribute_opt(start, "name");
    let Some(file) = get_attribute_opt(start, "file") else {
        return empty_robot(start, name_override);
    };

    let path = base_dir.join(file);
    let xml = std::fs::read_to_string(&path)
        .map_err(|source| DefinitionError::Include { path, source })?;
    let mut robot = parse_robot_str(&xml)?;
    if let Some(name) = name_override.filter(|n| !n.trim().is_empty()) {
        robot.name = name;
    }
    Ok(robot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_inline_robots_and_skips_other_content() {
        let xml = r#"
            <Environment>
                <camtrans>0 0 2</camtrans>
                <KinBody name="table"><Body name="top"/></KinBody>
                <Robot name="R1"><Joint name="j0"/></Robot>
                <Robot name="R2"/>
            </Environment>"#;
        let robots = parse_scene_str(xml, Path::new(".")).expect("scene should parse");
        let names: Vec<_> = robots.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["R1", "R2"]);
        assert_eq!(robots[0].dof(), 1);
    }

    #[test]
    fn resolves_includes_relative_to_scene_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(dir.path().join("robots")).expect("mkdir");
        std::fs::write(
            dir.path().join("robots/arm.robot.xml"),
            r#"<Robot name="arm"><Joint name="j0"/><Joint name="j1"/></Robot>"#,
        )
        .expect("write robot");

        let xml = r#"
            <Environment>
                <Robot file="robots/arm.robot.xml"/>
                <Robot file="robots/arm.robot.xml" name="arm2"></Robot>
            </Environment>"#;
        let robots = parse_scene_str(xml, dir.path()).expect("scene should parse");
        assert_eq!(robots.len(), 2);
        assert_eq!(robots[0].name, "arm");
        assert_eq!(robots[1].name, "arm2");
        assert_eq!(robots[1].dof(), 2);
    }

    #[test]
    fn missing_include_is_an_error() {
        let xml = r#"<Environment><Robot file="nope.robot.xml"/></Environment>"#;
        let err = parse_scene_str(xml, Path::new("/nonexistent")).unwrap_err();
        assert!(matches!(err, DefinitionError::Include { .. }));
    }

    #[test]
    fn bare_robot_document_is_a_scene() {
        let robots = parse_scene_str(r#"<Robot name="solo"/>"#, Path::new(".")).expect("parse");
        assert_eq!(robots.len(), 1);
        assert_eq!(robots[0].name, "solo");
    }

    #[test]
    fn empty_environment_has_no_robots() {
        let robots = parse_scene_str("<Environment/>", Path::new(".")).expect("parse");
        assert!(robots.is_empty());
    }

    #[test]
    fn rejects_unrelated_root() {
        assert!(parse_scene_str("<html></html>", Path::new(".")).is_err());
    }
}
