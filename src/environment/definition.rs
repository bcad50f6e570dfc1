//! Robot definition reader.
//!
//! Reads OpenRAVE-style robot XML into a [`RobotDefinition`]. Only the parts
//! the environment tracks are kept: the robot name and its hinge and slider
//! joints with their limits. Links, geometry and everything else is skipped.
//! Tag names are matched case-insensitively.

use std::f64::consts::PI;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;

use super::error::{DefinitionError, DefinitionResult};
use crate::components::DofState;

pub const DEFAULT_HINGE_LIMIT: f64 = PI;
pub const DEFAULT_SLIDER_LIMIT: f64 = 1.0;
pub const DEFAULT_MAX_VELOCITY: f64 = 10.0;
pub const DEFAULT_MAX_ACCELERATION: f64 = 50.0;
pub const DEFAULT_MAX_TORQUE: f64 = 100.0;
pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JointKind {
    /// Rotational joint, values in radians.
    Hinge,
    /// Linear joint, values in metres.
    Slider,
}

impl JointKind {
    fn from_attr(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hinge" | "revolute" => Some(Self::Hinge),
            "slider" | "prismatic" => Some(Self::Slider),
            _ => None,
        }
    }

    fn default_limit(self) -> f64 {
        match self {
            Self::Hinge => DEFAULT_HINGE_LIMIT,
            Self::Slider => DEFAULT_SLIDER_LIMIT,
        }
    }

    /// Scale applied to `<limits>`/`<limitsdeg>` values.
    fn display_scale(self) -> f64 {
        match self {
            Self::Hinge => PI / 180.0,
            Self::Slider => 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct JointDefinition {
    pub name: String,
    pub kind: JointKind,
    pub lower: f64,
    pub upper: f64,
    pub max_velocity: f64,
    pub max_acceleration: f64,
    pub max_torque: f64,
    pub weight: f64,
    pub initial: f64,
}

impl JointDefinition {
    pub fn new(name: impl Into<String>, kind: JointKind) -> Self {
        let limit = kind.default_limit();
        Self {
            name: name.into(),
            kind,
            lower: -limit,
            upper: limit,
            max_velocity: DEFAULT_MAX_VELOCITY,
            max_acceleration: DEFAULT_MAX_ACCELERATION,
            max_torque: DEFAULT_MAX_TORQUE,
            weight: DEFAULT_WEIGHT,
            initial: 0.0,
        }
    }
}

/// A parsed robot, ready to be added to an environment.
#[derive(Clone, Debug, PartialEq)]
pub struct RobotDefinition {
    pub name: String,
    pub joints: Vec<JointDefinition>,
}

impl RobotDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            joints: Vec::new(),
        }
    }

    pub fn with_joint(mut self, joint: JointDefinition) -> Self {
        self.joints.push(joint);
        self
    }

    pub fn dof(&self) -> usize {
        self.joints.len()
    }

    /// Initial joint state, with initial values clamped into limits.
    pub fn dof_state(&self) -> DofState {
        let mut state = DofState {
            joint_names: self.joints.iter().map(|j| j.name.clone()).collect(),
            values: self.joints.iter().map(|j| j.initial).collect(),
            lower_limits: self.joints.iter().map(|j| j.lower).collect(),
            upper_limits: self.joints.iter().map(|j| j.upper).collect(),
            velocity_limits: self.joints.iter().map(|j| j.max_velocity).collect(),
            acceleration_limits: self.joints.iter().map(|j| j.max_acceleration).collect(),
            torque_limits: self.joints.iter().map(|j| j.max_torque).collect(),
            weights: self.joints.iter().map(|j| j.weight).collect(),
        };
        state.clamp_values();
        state
    }
}

/// Parse a robot document whose root element is `<Robot>`.
pub fn parse_robot_str(xml: &str) -> DefinitionResult<RobotDefinition> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) if is_tag(e.name(), b"robot") => {
                let start = e.to_owned();
                return parse_robot(&mut reader, &start, None);
            }
            Event::Empty(ref e) if is_tag(e.name(), b"robot") => {
                return empty_robot(e, None);
            }
            Event::Start(_) | Event::Empty(_) | Event::Eof => {
                return Err(DefinitionError::missing_element("Robot", "robot document"));
            }
            _ => {}
        }
        buf.clear();
    }
}

/// Parse the content of a `<Robot>` start tag up to its end tag.
///
/// `name_override` replaces the `name` attribute, which is then optional.
pub(crate) fn parse_robot<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    name_override: Option<String>,
) -> DefinitionResult<RobotDefinition> {
    let mut robot = RobotDefinition::new(robot_name(start, name_override)?);
    collect_joints(reader, b"robot", &mut robot)?;
    check_unique_joints(&robot)?;
    Ok(robot)
}

/// A self-closing `<Robot name="..."/>` has no joints.
pub(crate) fn empty_robot(
    start: &BytesStart,
    name_override: Option<String>,
) -> DefinitionResult<RobotDefinition> {
    Ok(RobotDefinition::new(robot_name(start, name_override)?))
}

fn robot_name(start: &BytesStart, name_override: Option<String>) -> DefinitionResult<String> {
    let name = match name_override {
        Some(name) => name,
        None => get_attribute(start, "name")?,
    };
    if name.trim().is_empty() {
        return Err(DefinitionError::invalid_value("Robot", "empty robot name"));
    }
    Ok(name)
}

/// Walk children of `parent` collecting joints, descending into `<KinBody>`.
fn collect_joints<R: BufRead>(
    reader: &mut Reader<R>,
    parent: &[u8],
    robot: &mut RobotDefinition,
) -> DefinitionResult<()> {
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag = lower_name(e.name());
                match tag.as_slice() {
                    b"kinbody" => collect_joints(reader, b"kinbody", robot)?,
                    b"joint" => {
                        let start = e.to_owned();
                        robot.joints.push(parse_joint(reader, &start)?);
                    }
                    _ => skip_element(reader, &tag)?,
                }
            }
            Event::Empty(ref e) if is_tag(e.name(), b"joint") => {
                robot.joints.push(joint_header(e)?);
            }
            Event::End(ref e) if is_tag(e.name(), parent) => break,
            Event::Eof => {
                return Err(DefinitionError::Xml(format!(
                    "unexpected EOF in {}",
                    String::from_utf8_lossy(parent)
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Name and kind from the joint's attributes, with default parameters.
fn joint_header(start: &BytesStart) -> DefinitionResult<JointDefinition> {
    let name = get_attribute(start, "name")?;
    let kind = match get_attribute_opt(start, "type") {
        Some(t) => JointKind::from_attr(&t).ok_or(DefinitionError::UnknownJointType(t))?,
        None => JointKind::Hinge,
    };
    Ok(JointDefinition::new(name, kind))
}

fn parse_joint<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
) -> DefinitionResult<JointDefinition> {
    let mut joint = joint_header(start)?;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag = lower_name(e.name());
                match tag.as_slice() {
                    b"limits" | b"limitsdeg" => {
                        let [lower, upper] = read_pair(reader, &tag)?;
                        let scale = joint.kind.display_scale();
                        set_limits(&mut joint, lower * scale, upper * scale)?;
                    }
                    b"limitsrad" => {
                        let [lower, upper] = read_pair(reader, &tag)?;
                        set_limits(&mut joint, lower, upper)?;
                    }
                    b"maxvel" => joint.max_velocity = read_non_negative(reader, &tag)?,
                    b"maxaccel" => joint.max_acceleration = read_non_negative(reader, &tag)?,
                    b"maxtorque" => joint.max_torque = read_non_negative(reader, &tag)?,
                    b"weight" => joint.weight = read_non_negative(reader, &tag)?,
                    b"initial" => joint.initial = read_number(reader, &tag)?,
                    _ => skip_element(reader, &tag)?,
                }
            }
            Event::End(ref e) if is_tag(e.name(), b"joint") => break,
            Event::Eof => {
                return Err(DefinitionError::Xml(format!(
                    "unexpected EOF in joint '{}'",
                    joint.name
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(joint)
}

fn set_limits(joint: &mut JointDefinition, lower: f64, upper: f64) -> DefinitionResult<()> {
    if lower > upper {
        return Err(DefinitionError::invalid_value(
            "limits",
            format!("lower limit {lower} exceeds upper limit {upper} on joint '{}'", joint.name),
        ));
    }
    joint.lower = lower;
    joint.upper = upper;
    Ok(())
}

fn check_unique_joints(robot: &RobotDefinition) -> DefinitionResult<()> {
    for (i, joint) in robot.joints.iter().enumerate() {
        if robot.joints[..i].iter().any(|j| j.name == joint.name) {
            return Err(DefinitionError::DuplicateJoint(joint.name.clone()));
        }
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) fn lower_name(name: QName) -> Vec<u8> {
    name.as_ref().to_ascii_lowercase()
}

pub(crate) fn is_tag(name: QName, expected: &[u8]) -> bool {
    name.as_ref().eq_ignore_ascii_case(expected)
}

pub(crate) fn get_attribute(e: &BytesStart, name: &'static str) -> DefinitionResult<String> {
    get_attribute_opt(e, name)
        .ok_or_else(|| DefinitionError::missing_attribute(name, element_name(e)))
}

pub(crate) fn get_attribute_opt(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref().eq_ignore_ascii_case(name.as_bytes()))
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

/// Read the text content of the current element, consuming its end tag.
fn read_text<R: BufRead>(reader: &mut Reader<R>, tag: &[u8]) -> DefinitionResult<String> {
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(ref t) => text.push_str(&String::from_utf8_lossy(t)),
            Event::End(ref e) if is_tag(e.name(), tag) => break,
            Event::Start(ref e) => {
                let nested = lower_name(e.name());
                skip_element(reader, &nested)?;
            }
            Event::Eof => {
                return Err(DefinitionError::Xml(format!(
                    "unexpected EOF in {}",
                    String::from_utf8_lossy(tag)
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

fn read_numbers<R: BufRead>(reader: &mut Reader<R>, tag: &[u8]) -> DefinitionResult<Vec<f64>> {
    let text = read_text(reader, tag)?;
    let element = String::from_utf8_lossy(tag).to_string();
    text.split_whitespace()
        .map(|part| {
            part.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DefinitionError::invalid_value(&element, format!("not a number: {part}")))
        })
        .collect()
}

fn read_number<R: BufRead>(reader: &mut Reader<R>, tag: &[u8]) -> DefinitionResult<f64> {
    match read_numbers(reader, tag)?.as_slice() {
        [value] => Ok(*value),
        other => Err(DefinitionError::invalid_value(
            String::from_utf8_lossy(tag),
            format!("expected 1 value, got {}", other.len()),
        )),
    }
}

fn read_non_negative<R: BufRead>(reader: &mut Reader<R>, tag: &[u8]) -> DefinitionResult<f64> {
    let value = read_number(reader, tag)?;
    if value < 0.0 {
        return Err(DefinitionError::invalid_value(
            String::from_utf8_lossy(tag),
            format!("negative value {value}"),
        ));
    }
    Ok(value)
}

fn read_pair<R: BufRead>(reader: &mut Reader<R>, tag: &[u8]) -> DefinitionResult<[f64; 2]> {
    match read_numbers(reader, tag)?.as_slice() {
        [a, b] => Ok([*a, *b]),
        other => Err(DefinitionError::invalid_value(
            String::from_utf8_lossy(tag),
            format!("expected 2 values, got {}", other.len()),
        )),
    }
}

/// Skip an element and all its children. `name` must be lowercase.
pub(crate) fn skip_element<R: BufRead>(reader: &mut Reader<R>, name: &[u8]) -> DefinitionResult<()> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) if is_tag(e.name(), name) => depth += 1,
            Event::End(ref e) if is_tag(e.name(), name) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}
