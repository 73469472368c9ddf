use netops_protocol::inventory::{AutomationJob, Device};

/// What a completed form submits.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FormOutput {
    Device(Device),
    Job(AutomationJob),
}

#[derive(Debug, Clone)]
pub(crate) struct FormField {
    pub(crate) label: &'static str,
    pub(crate) value: String,
}

/// Line-oriented stand-in for the web console's modal forms. One field is
/// active at a time; Enter advances and submits from the last field.
#[derive(Debug, Clone)]
pub(crate) struct Form {
    pub(crate) title: String,
    kind: FormKind,
    pub(crate) fields: Vec<FormField>,
    pub(crate) active: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum FormKind {
    Device { id: Option<i64> },
    Job { id: Option<i64> },
}

impl Form {
    pub(crate) fn new_device() -> Self {
        Self::device_fields(None, "", "", "")
    }

    pub(crate) fn edit_device(device: &Device) -> Self {
        Self::device_fields(device.id, &device.name, &device.ip, &device.platform)
    }

    fn device_fields(id: Option<i64>, name: &str, ip: &str, platform: &str) -> Self {
        let title = if id.is_some() {
            "edit device"
        } else {
            "new device"
        };
        Self {
            title: title.to_string(),
            kind: FormKind::Device { id },
            fields: vec![
                FormField {
                    label: "name",
                    value: name.to_string(),
                },
                FormField {
                    label: "ip",
                    value: ip.to_string(),
                },
                FormField {
                    label: "platform",
                    value: platform.to_string(),
                },
            ],
            active: 0,
        }
    }

    pub(crate) fn new_job() -> Self {
        Self {
            title: "new automation job".to_string(),
            kind: FormKind::Job { id: None },
            fields: vec![
                FormField {
                    label: "name",
                    value: String::new(),
                },
                FormField {
                    label: "kind",
                    value: "inspect".to_string(),
                },
                FormField {
                    label: "cron",
                    value: String::new(),
                },
            ],
            active: 0,
        }
    }

    pub(crate) fn insert(&mut self, ch: char) {
        self.fields[self.active].value.push(ch);
    }

    pub(crate) fn backspace(&mut self) {
        self.fields[self.active].value.pop();
    }

    pub(crate) fn next_field(&mut self) {
        self.active = (self.active + 1) % self.fields.len();
    }

    fn field(&self, label: &str) -> String {
        self.fields
            .iter()
            .find(|field| field.label == label)
            .map(|field| field.value.trim().to_string())
            .unwrap_or_default()
    }

    /// Enter on the last field submits; anywhere else it advances.
    pub(crate) fn on_last_field(&self) -> bool {
        self.active + 1 == self.fields.len()
    }

    /// None until the required fields are filled in.
    pub(crate) fn submit(&self) -> Option<FormOutput> {
        match &self.kind {
            FormKind::Device { id } => {
                let name = self.field("name");
                let ip = self.field("ip");
                if name.is_empty() || ip.is_empty() {
                    return None;
                }
                Some(FormOutput::Device(Device {
                    id: *id,
                    name,
                    ip,
                    platform: self.field("platform"),
                    ..Device::default()
                }))
            }
            FormKind::Job { id } => {
                let name = self.field("name");
                if name.is_empty() {
                    return None;
                }
                let cron = self.field("cron");
                Some(FormOutput::Job(AutomationJob {
                    id: *id,
                    name,
                    kind: self.field("kind"),
                    cron: if cron.is_empty() { None } else { Some(cron) },
                    enabled: true,
                    device_names: Vec::new(),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_form_requires_name_and_ip() {
        let mut form = Form::new_device();
        assert_eq!(form.submit(), None);
        for ch in "core-01".chars() {
            form.insert(ch);
        }
        assert_eq!(form.submit(), None);
        form.next_field();
        for ch in "10.0.0.1".chars() {
            form.insert(ch);
        }
        match form.submit() {
            Some(FormOutput::Device(device)) => {
                assert_eq!(device.name, "core-01");
                assert_eq!(device.ip, "10.0.0.1");
                assert_eq!(device.id, None);
            }
            other => panic!("expected device output, got {other:?}"),
        }
    }

    #[test]
    fn edit_form_keeps_device_id() {
        let device = Device {
            id: Some(7),
            name: "edge-02".to_string(),
            ip: "10.0.0.2".to_string(),
            platform: "cisco_ios".to_string(),
            ..Device::default()
        };
        let form = Form::edit_device(&device);
        match form.submit() {
            Some(FormOutput::Device(saved)) => assert_eq!(saved.id, Some(7)),
            other => panic!("expected device output, got {other:?}"),
        }
    }

    #[test]
    fn field_cursor_wraps_and_tracks_last() {
        let mut form = Form::new_device();
        assert!(!form.on_last_field());
        form.next_field();
        form.next_field();
        assert!(form.on_last_field());
        form.next_field();
        assert_eq!(form.active, 0);
    }

    #[test]
    fn job_form_omits_blank_cron() {
        let mut form = Form::new_job();
        for ch in "nightly backup".chars() {
            form.insert(ch);
        }
        match form.submit() {
            Some(FormOutput::Job(job)) => {
                assert_eq!(job.cron, None);
                assert!(job.enabled);
                assert_eq!(job.kind, "inspect");
            }
            other => panic!("expected job output, got {other:?}"),
        }
    }

    #[test]
    fn backspace_edits_active_field() {
        let mut form = Form::new_device();
        form.insert('a');
        form.insert('b');
        form.backspace();
        assert_eq!(form.fields[0].value, "a");
    }
}
