//! Per-device MQTT topic layout.
//!
//! Four fixed topics, templated on the device identifier:
//!
//! | Purpose                        | Topic                  |
//! |--------------------------------|------------------------|
//! | registration ack (subscribe)   | `devices/D/response`   |
//! | action command (subscribe)     | `devices/D/action`     |
//! | registration request (publish) | `devices/D/register`   |
//! | state update (publish)         | `devices/D/update`     |

/// Classification of an inbound topic against this device's subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundTopic {
    /// Registration acknowledgment channel.
    Response,
    /// Actuator command channel.
    Action,
    /// Anything else — logged and ignored.
    Other,
}

/// The resolved topic set for one device.
#[derive(Debug, Clone)]
pub struct TopicSet {
    device_id: String,
    response: String,
    action: String,
    register: String,
    update: String,
}

impl TopicSet {
    pub fn for_device(device_id: &str) -> Self {
        Self {
            device_id: device_id.to_owned(),
            response: format!("devices/{device_id}/response"),
            action: format!("devices/{device_id}/action"),
            register: format!("devices/{device_id}/register"),
            update: format!("devices/{device_id}/update"),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Registration-ack subscription topic.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// Action-command subscription topic.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Registration-request publish topic.
    pub fn register(&self) -> &str {
        &self.register
    }

    /// State-update publish topic.
    pub fn update(&self) -> &str {
        &self.update
    }

    pub fn classify(&self, topic: &str) -> InboundTopic {
        if topic == self.response {
            InboundTopic::Response
        } else if topic == self.action {
            InboundTopic::Action
        } else {
            InboundTopic::Other
        }
    }
}
