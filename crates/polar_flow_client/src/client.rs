//! Login and date-windowed activity listing on top of a [`FlowSession`].

use crate::activity::Activity;
use crate::config::Config;
use crate::http_client::ReqwestFlowSession;
use crate::window::DateWindow;
use crate::{FlowError, FlowSession};
use chrono::NaiveDateTime;
use secrecy::SecretString;
use serde_json::Value;
use std::fmt;

/// Entry point for talking to Flow.
///
/// Calls are issued one at a time and awaited to completion. The session's
/// cookie jar is mutable state shared by every call on this client.
#[derive(Clone, Debug)]
pub struct FlowClient<S = ReqwestFlowSession> {
    session: S,
}

impl FlowClient<ReqwestFlowSession> {
    /// Build a client with a fresh cookie session for `cfg.base_url`.
    pub fn from_config(cfg: &Config) -> Result<Self, FlowError> {
        Ok(Self::new(ReqwestFlowSession::new(&cfg.base_url)?))
    }
}

impl<S: FlowSession> FlowClient<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), FlowError> {
        self.session.authenticate(username, password).await
    }

    pub async fn login_with_config(&self, cfg: &Config) -> Result<(), FlowError> {
        self.login(&cfg.username, &cfg.password).await
    }

    fn calendar_url(&self) -> String {
        format!("{}/training/getCalendarEvents", self.session.base_url())
    }

    /// List the activities between `start` and `end`.
    ///
    /// `end` defaults to now and `start` to 30 days before `end`. The whole
    /// window is fetched with a single request; records are built as the
    /// returned list is walked and exports are only fetched on request.
    pub async fn iter_activities(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<ActivityList<'_>, FlowError> {
        self.iter_activities_in(DateWindow::resolve(start, end)).await
    }

    pub async fn iter_activities_in(
        &self,
        window: DateWindow,
    ) -> Result<ActivityList<'_>, FlowError> {
        tracing::debug!(
            "Fetching activities between {} and {}",
            window.start,
            window.end
        );
        let url = self.calendar_url();
        let pairs = window.query_pairs();
        let qp: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let items = match self.session.get_json(&url, &qp).await? {
            Value::Array(items) => items,
            other => {
                return Err(FlowError::UnexpectedResponse {
                    url,
                    reason: format!("expected a JSON array of activities, got {other}"),
                });
            }
        };
        tracing::debug!("calendar returned {} activities", items.len());
        Ok(ActivityList {
            session: &self.session,
            items,
        })
    }

    /// Same as [`FlowClient::iter_activities`], with every record built up front.
    pub async fn activities(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<Activity<'_>>, FlowError> {
        self.iter_activities(start, end).await?.into_iter().collect()
    }
}

/// The raw activity list of one calendar query.
///
/// Walking it wraps each element in an [`Activity`], in the order the service
/// returned them. It can be walked any number of times through [`ActivityList::iter`].
pub struct ActivityList<'a> {
    session: &'a dyn FlowSession,
    items: Vec<Value>,
}

impl<'a> ActivityList<'a> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The list elements as received.
    pub fn raw(&self) -> &[Value] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<Activity<'a>, FlowError>> + '_ {
        let session = self.session;
        self.items
            .iter()
            .enumerate()
            .map(move |(index, value)| Activity::from_value(session, index, value.clone()))
    }
}

impl fmt::Debug for ActivityList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityList")
            .field("items", &self.items)
            .finish()
    }
}

impl<'a> IntoIterator for ActivityList<'a> {
    type Item = Result<Activity<'a>, FlowError>;
    type IntoIter = ActivityIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        ActivityIter {
            session: self.session,
            items: self.items.into_iter().enumerate(),
        }
    }
}

/// Owning iterator over an [`ActivityList`].
pub struct ActivityIter<'a> {
    session: &'a dyn FlowSession,
    items: std::iter::Enumerate<std::vec::IntoIter<Value>>,
}

impl<'a> Iterator for ActivityIter<'a> {
    type Item = Result<Activity<'a>, FlowError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (index, value) = self.items.next()?;
        Some(Activity::from_value(self.session, index, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl ExactSizeIterator for ActivityIter<'_> {}
