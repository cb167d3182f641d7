use crate::constants::{MAX_MESSAGE_SIZE, RECENT_VISITS_LIMIT};
use crate::platform::PermissionProbe;
use crate::policy::PolicyStore;
use crate::validation;
use log::warn;
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum IncomingMessage {
    #[serde(rename = "set_blocked_apps")]
    SetBlockedApps { apps: Vec<String> },
    #[serde(rename = "set_sub_screen_flag")]
    SetSubScreenFlag { enabled: bool },
    #[serde(rename = "set_enabled")]
    SetEnabled { enabled: bool },
    #[serde(rename = "add_schedule")]
    AddSchedule {
        days_of_week: String,
        start_time: String,
        end_time: String,
    },
    #[serde(rename = "remove_schedule")]
    RemoveSchedule { id: i64 },
    #[serde(rename = "list_schedules")]
    ListSchedules,
    #[serde(rename = "request_status")]
    RequestStatus,
    #[serde(rename = "recent_visits")]
    RecentVisits,
    #[serde(rename = "open_overlay_settings")]
    OpenOverlaySettings,
    #[serde(rename = "open_monitor_settings")]
    OpenMonitorSettings,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum OutgoingMessage {
    #[serde(rename = "ack")]
    Ack,
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(rename = "status")]
    Status {
        #[serde(rename = "monitorRunning")]
        monitor_running: bool,
        #[serde(rename = "overlayPermission")]
        overlay_permission: bool,
        #[serde(rename = "enforcementActive")]
        enforcement_active: bool,
        #[serde(rename = "subScreenBlocked")]
        sub_screen_blocked: bool,
        #[serde(rename = "blockedAppCount")]
        blocked_app_count: usize,
    },
    #[serde(rename = "schedule_added")]
    ScheduleAdded { id: i64 },
    #[serde(rename = "schedules")]
    Schedules { schedules: Vec<ScheduleInfo> },
    #[serde(rename = "visits")]
    Visits { urls: Vec<String> },
}

#[derive(Debug, Serialize)]
pub struct ScheduleInfo {
    pub id: Option<i64>,
    pub days_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub enabled: bool,
}

/// Request/response host for the external configuration surface.
///
/// Speaks the native-messaging framing: a little-endian u32 length prefix
/// followed by a JSON payload, both directions, over stdin/stdout.
pub struct ConfigHost {
    policy: Arc<PolicyStore>,
    permissions: Arc<dyn PermissionProbe>,
}

impl ConfigHost {
    pub fn new(policy: Arc<PolicyStore>, permissions: Arc<dyn PermissionProbe>) -> Self {
        Self { policy, permissions }
    }

    pub fn run(&self) -> io::Result<()> {
        let mut stdin = io::stdin().lock();
        let mut stdout = io::stdout().lock();
        loop {
            let message = read_message(&mut stdin)?;
            let response = self.handle_message(message);
            write_message(&mut stdout, &response)?;
        }
    }

    pub fn handle_message(&self, message: IncomingMessage) -> OutgoingMessage {
        match self.try_handle(message) {
            Ok(response) => response,
            Err(e) => {
                warn!("configuration request failed: {}", e);
                OutgoingMessage::Error { message: e.to_string() }
            }
        }
    }

    fn try_handle(&self, message: IncomingMessage) -> Result<OutgoingMessage, crate::error::AppError> {
        match message {
            IncomingMessage::SetBlockedApps { apps } => {
                let apps = validation::validate_app_list(&apps)?;
                self.policy.set_restricted_apps(&apps)?;
                Ok(OutgoingMessage::Ack)
            }
            IncomingMessage::SetSubScreenFlag { enabled } => {
                self.policy.set_sub_screen_enabled(enabled)?;
                Ok(OutgoingMessage::Ack)
            }
            IncomingMessage::SetEnabled { enabled } => {
                self.policy.set_enforcement_enabled(enabled)?;
                Ok(OutgoingMessage::Ack)
            }
            IncomingMessage::AddSchedule { days_of_week, start_time, end_time } => {
                validation::validate_days_of_week(&days_of_week)?;
                validation::validate_time_format(&start_time)?;
                validation::validate_time_format(&end_time)?;
                let id = self.policy.add_schedule(&days_of_week, &start_time, &end_time)?;
                Ok(OutgoingMessage::ScheduleAdded { id })
            }
            IncomingMessage::RemoveSchedule { id } => {
                if self.policy.remove_schedule(id)? {
                    Ok(OutgoingMessage::Ack)
                } else {
                    Err(crate::error::AppError::NotFound { entity: "schedule" })
                }
            }
            IncomingMessage::ListSchedules => {
                let schedules = self
                    .policy
                    .schedules()?
                    .into_iter()
                    .map(|s| ScheduleInfo {
                        id: s.id,
                        days_of_week: s.days_of_week,
                        start_time: s.start_time,
                        end_time: s.end_time,
                        enabled: s.enabled,
                    })
                    .collect();
                Ok(OutgoingMessage::Schedules { schedules })
            }
            IncomingMessage::RequestStatus => {
                let snapshot = self.policy.snapshot()?;
                Ok(OutgoingMessage::Status {
                    monitor_running: self.policy.monitor_running()?,
                    overlay_permission: self.permissions.overlay_granted(),
                    enforcement_active: snapshot.enforcement_active,
                    sub_screen_blocked: snapshot.sub_screen_enabled,
                    blocked_app_count: snapshot.restricted.len(),
                })
            }
            IncomingMessage::RecentVisits => {
                let urls = self.policy.recent_visits(RECENT_VISITS_LIMIT)?;
                Ok(OutgoingMessage::Visits { urls })
            }
            IncomingMessage::OpenOverlaySettings => {
                self.permissions.open_overlay_settings();
                Ok(OutgoingMessage::Ack)
            }
            IncomingMessage::OpenMonitorSettings => {
                self.permissions.open_monitor_settings();
                Ok(OutgoingMessage::Ack)
            }
        }
    }
}

fn read_message(reader: &mut impl Read) -> io::Result<IncomingMessage> {
    // Native messaging specifies little-endian byte order
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;

    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Message too large: {} bytes (max: {} bytes)", len, MAX_MESSAGE_SIZE),
        ));
    }

    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer)?;

    serde_json::from_slice(&buffer)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn write_message(writer: &mut impl Write, message: &OutgoingMessage) -> io::Result<()> {
    let json = serde_json::to_vec(message)?;
    let len = json.len() as u32;

    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&json)?;
    writer.flush()?;

    Ok(())
}
