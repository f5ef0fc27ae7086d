//! Rendering session abstraction consumed by the review pipeline.
//!
//! A session owns one page at a time: it navigates, answers rule queries with
//! the matching elements and activates links/buttons. The pipeline never
//! shares a session between runs.

pub mod http;

use async_trait::async_trait;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub use http::{HttpSession, HttpSessionFactory};

/// Lookup expression used to query a rendered page (a CSS selector for
/// [`HttpSession`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CandidateRule(Cow<'static, str>);

impl CandidateRule {
    /// Creates a rule from a static expression, usable in `static` tables.
    pub const fn from_static(expr: &'static str) -> Self {
        Self(Cow::Borrowed(expr))
    }

    /// Creates a rule from an owned expression.
    pub fn new(expr: impl Into<String>) -> Self {
        Self(Cow::Owned(expr.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for CandidateRule {
    fn from(expr: &'static str) -> Self {
        Self::from_static(expr)
    }
}

impl fmt::Display for CandidateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An element matched by a rule query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Rendered text, whitespace-collapsed.
    pub text: String,
    /// False for hidden or disabled elements.
    pub visible: bool,
    /// Opaque activation handle; the link target for [`HttpSession`].
    pub handle: Option<String>,
}

impl Element {
    pub fn new(text: impl Into<String>, visible: bool) -> Self {
        Self { text: text.into(), visible, handle: None }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }
}

/// Errors raised by a rendering session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The session itself could not be created.
    #[error("Session unavailable: {0}")]
    Unavailable(String),

    /// A page could not be reached or rendered.
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// A readiness wait did not complete in time.
    #[error("Timed out after {timeout:?} waiting for `{rule}`")]
    Timeout { rule: String, timeout: Duration },

    /// The rule could not be evaluated by this session.
    #[error("Invalid rule `{rule}`: {reason}")]
    InvalidRule { rule: String, reason: String },

    /// The element cannot be clicked/followed.
    #[error("Element cannot be activated: {0}")]
    Activation(String),
}

impl SessionError {
    pub fn navigation(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Navigation { url: url.into(), reason: reason.to_string() }
    }
}

/// A single-page rendering session.
#[async_trait]
pub trait RenderingSession: Send {
    /// Loads `url` as the current page.
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    /// Blocks until `rule` matches on the current page or `timeout` elapses.
    async fn wait_for_ready(
        &mut self,
        rule: &CandidateRule,
        timeout: Duration,
    ) -> Result<(), SessionError>;

    /// Returns every element matching `rule`, in document order.
    async fn query(&mut self, rule: &CandidateRule) -> Result<Vec<Element>, SessionError>;

    /// Clicks/follows an element previously returned by [`query`](Self::query).
    async fn activate(&mut self, element: &Element) -> Result<(), SessionError>;

    /// Scrolls the viewport by `offset` pixels to trigger lazy content.
    async fn scroll(&mut self, offset: i64) -> Result<(), SessionError>;

    /// URL of the current page, if any page has been loaded.
    fn current_url(&self) -> Option<&str>;

    /// Releases the underlying resources. Called exactly once by [`SessionGuard`].
    fn release(&mut self);
}

/// Creates one independent session per pipeline run.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: RenderingSession;

    async fn open(&self) -> Result<Self::Session, SessionError>;
}

/// Scoped owner of a session; releases it when dropped, on every exit path.
pub struct SessionGuard<S: RenderingSession> {
    session: S,
}

impl<S: RenderingSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: RenderingSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: RenderingSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: RenderingSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.release();
        debug!("Session released");
    }
}
