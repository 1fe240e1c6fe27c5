//! Typed path parameter helpers.

use uuid::Uuid;

use planner_core::error::AppError;

/// Parses a typed id from a path segment.
pub fn parse_id<T: From<Uuid>>(s: &str) -> Result<T, AppError> {
    Uuid::parse_str(s)
        .map(T::from)
        .map_err(|_| AppError::validation(format!("Invalid id: {s}")))
}

#[cfg(test)]
mod tests {
    use planner_core::types::FloorPlanId;

    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        let parsed: FloorPlanId = parse_id(&id.to_string()).unwrap();
        assert_eq!(parsed.into_uuid(), id);
        assert!(parse_id::<FloorPlanId>("nope").is_err());
    }
}
