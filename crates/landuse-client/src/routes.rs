//! REST routes of the backend contract.

use landuse_core::{EntityId, JobId, Route, ScenarioId, SessionId};

pub fn create_session() -> Route {
    Route::new(["users"])
}

pub fn session(id: &SessionId) -> Route {
    with_id("session", id)
}

pub fn scenarios(session_id: &SessionId) -> Route {
    with_id("scenarios", session_id)
}

pub fn scenario(id: &ScenarioId) -> Route {
    with_id("scenario", id)
}

/// Scenario creation is posted to the owning session's collection.
pub fn create_scenario(session_id: &SessionId) -> Route {
    with_id("scenario", session_id)
}

pub fn patterns(session_id: &SessionId) -> Route {
    with_id("pattern", session_id)
}

pub fn wallpaper() -> Route {
    Route::new(["wallpaper"])
}

pub fn lulc_fill() -> Route {
    Route::new(["lulc_fill"])
}

pub fn lulc_crop(scenario_id: &ScenarioId) -> Route {
    with_id("lulc_crop", scenario_id)
}

pub fn jobs() -> Route {
    Route::new(["jobs"])
}

pub fn job(id: &JobId) -> Route {
    with_id("job", id)
}

pub fn job_result(id: &JobId) -> Route {
    Route::new(["job", id.as_str(), "result"])
}

pub fn lulc_codes() -> Route {
    Route::new(["lulc_codes"])
}

pub fn lulc_table() -> Route {
    Route::new(["lulc_table"])
}

fn with_id<T: EntityId>(collection: &str, id: &T) -> Route {
    Route::new([collection, id.as_str()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(create_session().to_string(), "/users");
        assert_eq!(session(&SessionId::new("abc")).to_string(), "/session/abc");
        assert_eq!(scenarios(&SessionId::new("abc")).to_string(), "/scenarios/abc");
        assert_eq!(scenario(&ScenarioId::new("7")).to_string(), "/scenario/7");
        assert_eq!(create_scenario(&SessionId::new("abc")).to_string(), "/scenario/abc");
        assert_eq!(patterns(&SessionId::new("abc")).to_string(), "/pattern/abc");
        assert_eq!(lulc_crop(&ScenarioId::new("7")).to_string(), "/lulc_crop/7");
        assert_eq!(jobs().to_string(), "/jobs");
        assert_eq!(job(&JobId::new("9")).to_string(), "/job/9");
        assert_eq!(job_result(&JobId::new("9")).to_string(), "/job/9/result");
    }

    #[test]
    fn test_id_stays_one_segment() {
        let route = job_result(&JobId::new("a/b"));
        assert_eq!(route.segments().collect::<Vec<_>>(), ["job", "a/b", "result"]);
    }
}
