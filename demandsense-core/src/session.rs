use std::collections::HashMap;

use crate::{error::WeatherError, model::WeatherReading};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last successful live reading per session.
///
/// Entries are only overwritten by a newer successful fetch; failures leave
/// the previous reading in place.
#[derive(Debug, Default)]
pub struct SessionCache {
    last: HashMap<SessionId, WeatherReading>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `result` if it is a reading. Returns true when the cache changed.
    pub fn record(
        &mut self,
        session: &SessionId,
        result: &Result<WeatherReading, WeatherError>,
    ) -> bool {
        match result {
            Ok(reading) => {
                self.last.insert(session.clone(), reading.clone());
                true
            }
            Err(_) => false,
        }
    }

    pub fn last(&self, session: &SessionId) -> Option<&WeatherReading> {
        self.last.get(session)
    }
}
