//! Name paths into the configuration tree.
//!
//! A [`ConfigPath`] is a list of group segments below the channel group,
//! optionally terminated by a value or policy name. Resolving a path yields a
//! tagged [`Lookup`] so callers can tell "absent" apart from "present under a
//! different element kind".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConfigError, Result};
use crate::schema::CHANNEL_GROUP_KEY;
use crate::tree::{Group, Policy, Value};

/// The kind of element a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Group,
    Value,
    Policy,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ElementKind::Group => "group",
            ElementKind::Value => "value",
            ElementKind::Policy => "policy",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum Leaf {
    Value(String),
    Policy(String),
}

/// Path of an element, relative to the channel group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigPath {
    groups: Vec<String>,
    leaf: Option<Leaf>,
}

impl ConfigPath {
    /// The channel group itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// A group path from its segments.
    pub fn group<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            groups: segments.into_iter().map(Into::into).collect(),
            leaf: None,
        }
    }

    /// Path of the subgroup `name` of this group path.
    ///
    /// Any terminal value or policy on `self` is dropped.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut groups = self.groups.clone();
        groups.push(name.into());
        Self { groups, leaf: None }
    }

    /// Path of the value `name` inside this group path.
    pub fn value(&self, name: impl Into<String>) -> Self {
        Self {
            groups: self.groups.clone(),
            leaf: Some(Leaf::Value(name.into())),
        }
    }

    /// Path of the policy `name` inside this group path.
    pub fn policy(&self, name: impl Into<String>) -> Self {
        Self {
            groups: self.groups.clone(),
            leaf: Some(Leaf::Policy(name.into())),
        }
    }

    /// Path of an element of the given kind inside this group path.
    pub fn join(&self, kind: ElementKind, name: impl Into<String>) -> Self {
        match kind {
            ElementKind::Group => self.child(name),
            ElementKind::Value => self.value(name),
            ElementKind::Policy => self.policy(name),
        }
    }

    /// Group segments, outermost first.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Terminal value or policy, if the path does not name a group.
    pub fn leaf(&self) -> Option<(ElementKind, &str)> {
        match &self.leaf {
            Some(Leaf::Value(name)) => Some((ElementKind::Value, name)),
            Some(Leaf::Policy(name)) => Some((ElementKind::Policy, name)),
            None => None,
        }
    }

    /// The kind of element this path names.
    pub fn kind(&self) -> ElementKind {
        self.leaf().map_or(ElementKind::Group, |(kind, _)| kind)
    }

    /// Last name on the path, `None` for the channel group.
    pub fn name(&self) -> Option<&str> {
        match self.leaf() {
            Some((_, name)) => Some(name),
            None => self.groups.last().map(String::as_str),
        }
    }

    pub fn is_root(&self) -> bool {
        self.groups.is_empty() && self.leaf.is_none()
    }

    /// The group path that directly contains this element.
    pub fn parent(&self) -> Option<Self> {
        if self.leaf.is_some() {
            return Some(Self::group(self.groups.iter().cloned()));
        }
        let (_, rest) = self.groups.split_last()?;
        Some(Self::group(rest.iter().cloned()))
    }

    /// The group part of this path (itself when it names a group).
    pub fn group_path(&self) -> Self {
        Self::group(self.groups.iter().cloned())
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", CHANNEL_GROUP_KEY)?;
        for segment in &self.groups {
            write!(f, "/{}", segment)?;
        }
        match &self.leaf {
            Some(Leaf::Value(name)) => write!(f, "/Values/{}", name),
            Some(Leaf::Policy(name)) => write!(f, "/Policies/{}", name),
            None => Ok(()),
        }
    }
}

/// A resolved element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node<'a> {
    Group(&'a Group),
    Value(&'a Value),
    Policy(&'a Policy),
}

impl Node<'_> {
    pub fn kind(&self) -> ElementKind {
        match self {
            Node::Group(_) => ElementKind::Group,
            Node::Value(_) => ElementKind::Value,
            Node::Policy(_) => ElementKind::Policy,
        }
    }
}

/// Outcome of resolving a [`ConfigPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found(Node<'a>),
    /// `path` is the shortest prefix of the requested path that is absent.
    NotFound(ConfigPath),
    /// An element exists at `path`, but it is not of the expected kind.
    WrongType {
        path: ConfigPath,
        expected: ElementKind,
        found: ElementKind,
    },
}

impl<'a> Lookup<'a> {
    pub fn found(self) -> Option<Node<'a>> {
        match self {
            Lookup::Found(node) => Some(node),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Node<'a>> {
        match self {
            Lookup::Found(node) => Ok(node),
            Lookup::NotFound(path) => Err(ConfigError::NotFound(path)),
            Lookup::WrongType {
                path,
                expected,
                found,
            } => Err(ConfigError::WrongType {
                path,
                expected,
                found,
            }),
        }
    }
}
