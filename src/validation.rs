use crate::constants::{MAX_BLOCKED_APPS, MAX_PACKAGE_LEN};
use crate::error::AppError;

/// Validate a package identifier.
pub fn validate_package(package: &str) -> Result<&str, AppError> {
    let package = package.trim();
    if package.is_empty() {
        return Err(AppError::InvalidInput {
            field: "package",
            reason: "cannot be empty".into(),
        });
    }
    if package.len() > MAX_PACKAGE_LEN {
        return Err(AppError::InvalidInput {
            field: "package",
            reason: format!("cannot exceed {} characters", MAX_PACKAGE_LEN),
        });
    }
    if package.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidInput {
            field: "package",
            reason: "must not contain whitespace".into(),
        });
    }
    Ok(package)
}

/// Validate a whole restriction list, returning the trimmed packages.
pub fn validate_app_list(apps: &[String]) -> Result<Vec<String>, AppError> {
    if apps.len() > MAX_BLOCKED_APPS {
        return Err(AppError::InvalidInput {
            field: "apps",
            reason: format!("cannot exceed {} entries", MAX_BLOCKED_APPS),
        });
    }
    apps.iter()
        .map(|app| validate_package(app).map(str::to_string))
        .collect()
}

/// Validate time format (HH:MM, 24-hour format).
pub fn validate_time_format(time: &str) -> Result<(), AppError> {
    let err = |reason: &str| AppError::InvalidInput {
        field: "time",
        reason: reason.into(),
    };

    if time.len() != 5 || &time[2..3] != ":" {
        return Err(err("must be in HH:MM format"));
    }

    let hours: u32 = time[0..2].parse().map_err(|_| err("invalid hours"))?;
    let minutes: u32 = time[3..5].parse().map_err(|_| err("invalid minutes"))?;

    if hours >= 24 {
        return Err(err("hours must be 00-23"));
    }
    if minutes >= 60 {
        return Err(err("minutes must be 00-59"));
    }

    Ok(())
}

/// Validate days_of_week format (comma-separated day numbers 1-7).
pub fn validate_days_of_week(days: &str) -> Result<(), AppError> {
    if days.is_empty() {
        return Err(AppError::InvalidInput {
            field: "days_of_week",
            reason: "at least one day required".into(),
        });
    }

    for part in days.split(',') {
        let day: u32 = part.trim().parse().map_err(|_| AppError::InvalidInput {
            field: "days_of_week",
            reason: format!("invalid day: '{}'", part.trim()),
        })?;

        if !(1..=7).contains(&day) {
            return Err(AppError::InvalidInput {
                field: "days_of_week",
                reason: format!("day must be 1-7, got {}", day),
            });
        }
    }

    Ok(())
}
