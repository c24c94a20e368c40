use vizlab_common::Color;

/// A single widget and its current value.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Slider {
        value: f32,
        min: f32,
        max: f32,
        step: f32,
    },
    Toggle(bool),
    Text(String),
    Color(Color),
    Button,
}

/// Something the user did, for the owning demo to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    /// A button was pressed.
    Pressed(String),
    /// A value control was edited.
    Changed(String),
}

/// Errors from driving the panel by key and string value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PanelError {
    #[error("no control with key {0:?}")]
    UnknownKey(String),
    #[error("invalid value {value:?} for control {key:?}")]
    InvalidValue { key: String, value: String },
}

/// A keyed, labelled control.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlEntry {
    pub key: String,
    pub label: String,
    pub control: Control,
}

/// A titled, collapsible group of controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub title: String,
    pub visible: bool,
    pub controls: Vec<ControlEntry>,
}

impl Folder {
    fn push(&mut self, key: &str, label: &str, control: Control) -> &mut Self {
        self.controls.push(ControlEntry {
            key: key.to_string(),
            label: label.to_string(),
            control,
        });
        self
    }

    pub fn slider(&mut self, key: &str, label: &str, value: f32, min: f32, max: f32, step: f32) -> &mut Self {
        let value = snap(value, min, max, step);
        self.push(
            key,
            label,
            Control::Slider {
                value,
                min,
                max,
                step,
            },
        )
    }

    pub fn toggle(&mut self, key: &str, label: &str, value: bool) -> &mut Self {
        self.push(key, label, Control::Toggle(value))
    }

    pub fn text(&mut self, key: &str, label: &str, value: &str) -> &mut Self {
        self.push(key, label, Control::Text(value.to_string()))
    }

    pub fn color(&mut self, key: &str, label: &str, value: Color) -> &mut Self {
        self.push(key, label, Control::Color(value))
    }

    pub fn button(&mut self, key: &str, label: &str) -> &mut Self {
        self.push(key, label, Control::Button)
    }
}

fn snap(value: f32, min: f32, max: f32, step: f32) -> f32 {
    let clamped = value.clamp(min, max);
    if step <= 0.0 {
        return clamped;
    }
    let steps = ((clamped - min) / step).round();
    (min + steps * step).clamp(min, max)
}

/// Folders of controls plus the queue of actions they produced.
#[derive(Debug, Clone, Default)]
pub struct ControlPanel {
    folders: Vec<Folder>,
    actions: Vec<PanelAction>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a visible folder and return it for chained control declarations.
    pub fn add_folder(&mut self, title: &str) -> &mut Folder {
        self.folders.push(Folder {
            title: title.to_string(),
            visible: true,
            controls: Vec::new(),
        });
        let last = self.folders.len() - 1;
        &mut self.folders[last]
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn folder(&self, title: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.title == title)
    }

    fn set_folder_visible(&mut self, title: &str, visible: bool) -> bool {
        match self.folders.iter_mut().find(|f| f.title == title) {
            Some(folder) => {
                folder.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn show_folder(&mut self, title: &str) -> bool {
        self.set_folder_visible(title, true)
    }

    pub fn hide_folder(&mut self, title: &str) -> bool {
        self.set_folder_visible(title, false)
    }

    pub fn get(&self, key: &str) -> Option<&Control> {
        self.folders
            .iter()
            .flat_map(|f| f.controls.iter())
            .find(|c| c.key == key)
            .map(|c| &c.control)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Control> {
        self.folders
            .iter_mut()
            .flat_map(|f| f.controls.iter_mut())
            .find(|c| c.key == key)
            .map(|c| &mut c.control)
    }

    pub fn slider(&self, key: &str) -> Option<f32> {
        match self.get(key)? {
            Control::Slider { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn toggle(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Control::Toggle(v) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Control::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn color(&self, key: &str) -> Option<Color> {
        match self.get(key)? {
            Control::Color(v) => Some(*v),
            _ => None,
        }
    }

    fn changed(&mut self, key: &str) {
        tracing::trace!(key, "panel value changed");
        self.actions.push(PanelAction::Changed(key.to_string()));
    }

    /// Set a slider, clamping and snapping to its step. Returns false if
    /// `key` is not a slider.
    pub fn set_slider(&mut self, key: &str, new: f32) -> bool {
        let Some(Control::Slider {
            value,
            min,
            max,
            step,
        }) = self.get_mut(key)
        else {
            return false;
        };
        let snapped = snap(new, *min, *max, *step);
        if snapped != *value {
            *value = snapped;
            self.changed(key);
        }
        true
    }

    pub fn set_toggle(&mut self, key: &str, new: bool) -> bool {
        let Some(Control::Toggle(value)) = self.get_mut(key) else {
            return false;
        };
        if *value != new {
            *value = new;
            self.changed(key);
        }
        true
    }

    pub fn set_text(&mut self, key: &str, new: &str) -> bool {
        let Some(Control::Text(value)) = self.get_mut(key) else {
            return false;
        };
        if value.as_str() != new {
            *value = new.to_string();
            self.changed(key);
        }
        true
    }

    pub fn set_color(&mut self, key: &str, new: Color) -> bool {
        let Some(Control::Color(value)) = self.get_mut(key) else {
            return false;
        };
        if *value != new {
            *value = new;
            self.changed(key);
        }
        true
    }

    /// Press a button. Returns false if `key` is not a button.
    pub fn press(&mut self, key: &str) -> bool {
        if !matches!(self.get(key), Some(Control::Button)) {
            return false;
        }
        tracing::debug!(key, "panel button pressed");
        self.actions.push(PanelAction::Pressed(key.to_string()));
        true
    }

    /// Set any value control from its textual form, or press a button
    /// (`value` is ignored for buttons).
    pub fn apply_str(&mut self, key: &str, value: &str) -> Result<(), PanelError> {
        let invalid = || PanelError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match self.get(key) {
            None => Err(PanelError::UnknownKey(key.to_string())),
            Some(Control::Slider { .. }) => {
                let v: f32 = value.trim().parse().map_err(|_| invalid())?;
                self.set_slider(key, v);
                Ok(())
            }
            Some(Control::Toggle(_)) => {
                let v: bool = value.trim().parse().map_err(|_| invalid())?;
                self.set_toggle(key, v);
                Ok(())
            }
            Some(Control::Text(_)) => {
                self.set_text(key, value);
                Ok(())
            }
            Some(Control::Color(_)) => {
                let v = Color::parse(value).map_err(|_| invalid())?;
                self.set_color(key, v);
                Ok(())
            }
            Some(Control::Button) => {
                self.press(key);
                Ok(())
            }
        }
    }

    /// Take every action queued since the last call.
    pub fn drain_actions(&mut self) -> Vec<PanelAction> {
        std::mem::take(&mut self.actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knot_panel() -> ControlPanel {
        let mut panel = ControlPanel::new();
        panel
            .add_folder("Torus Knot")
            .toggle("play", "Animate", false)
            .slider("height", "Height", 1.0, -5.0, 5.0, 0.5)
            .slider("speed", "Speed", 1.0, 1.0, 10.0, 0.1)
            .button("reset", "Reset");
        panel.add_folder("Plane").toggle("wireframe", "Toggle Wireframe", true);
        panel
    }

    #[test]
    fn folders_keep_declaration_order() {
        let panel = knot_panel();
        let titles: Vec<&str> = panel.folders().iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["Torus Knot", "Plane"]);
        assert_eq!(panel.folder("Torus Knot").unwrap().controls.len(), 4);
    }

    #[test]
    fn typed_getters() {
        let panel = knot_panel();
        assert_eq!(panel.toggle("play"), Some(false));
        assert_eq!(panel.slider("height"), Some(1.0));
        assert_eq!(panel.toggle("height"), None);
        assert_eq!(panel.slider("missing"), None);
    }

    #[test]
    fn slider_clamps_and_snaps() {
        let mut panel = knot_panel();
        assert!(panel.set_slider("height", 9.0));
        assert_eq!(panel.slider("height"), Some(5.0));
        panel.set_slider("height", 1.3);
        assert_eq!(panel.slider("height"), Some(1.5));
        panel.set_slider("height", -7.0);
        assert_eq!(panel.slider("height"), Some(-5.0));
    }

    #[test]
    fn changes_queue_actions_once() {
        let mut panel = knot_panel();
        panel.set_toggle("play", true);
        panel.set_toggle("play", true);
        panel.set_slider("speed", 1.0);
        let actions = panel.drain_actions();
        assert_eq!(actions, vec![PanelAction::Changed("play".into())]);
        assert!(panel.drain_actions().is_empty());
    }

    #[test]
    fn press_only_works_on_buttons() {
        let mut panel = knot_panel();
        assert!(panel.press("reset"));
        assert!(!panel.press("play"));
        assert_eq!(panel.drain_actions(), vec![PanelAction::Pressed("reset".into())]);
    }

    #[test]
    fn setters_reject_wrong_kind() {
        let mut panel = knot_panel();
        assert!(!panel.set_slider("play", 2.0));
        assert!(!panel.set_text("play", "x"));
        assert!(!panel.set_color("play", Color::BLACK));
    }

    #[test]
    fn text_and_color_values() {
        let mut panel = ControlPanel::new();
        panel
            .add_folder("Source Text")
            .text("source", "SourceText", "Here is my source text.")
            .color("tint", "Tint", Color::WHITE);
        assert!(panel.set_text("source", "new text"));
        assert_eq!(panel.text("source"), Some("new text"));
        assert!(panel.set_color("tint", Color::BLACK));
        assert_eq!(panel.color("tint"), Some(Color::BLACK));
        assert_eq!(panel.drain_actions().len(), 2);
    }

    #[test]
    fn show_and_hide_folders() {
        let mut panel = knot_panel();
        assert!(panel.hide_folder("Plane"));
        assert!(!panel.folder("Plane").unwrap().visible);
        assert!(panel.show_folder("Plane"));
        assert!(panel.folder("Plane").unwrap().visible);
        assert!(!panel.hide_folder("Nope"));
    }

    #[test]
    fn apply_str_dispatches_on_kind() {
        let mut panel = knot_panel();
        panel.apply_str("play", "true").unwrap();
        panel.apply_str("height", "2.2").unwrap();
        panel.apply_str("reset", "").unwrap();
        assert_eq!(panel.toggle("play"), Some(true));
        assert_eq!(panel.slider("height"), Some(2.0));
        assert_eq!(panel.drain_actions().len(), 3);

        assert_eq!(
            panel.apply_str("nope", "1"),
            Err(PanelError::UnknownKey("nope".into()))
        );
        assert!(matches!(
            panel.apply_str("speed", "fast"),
            Err(PanelError::InvalidValue { .. })
        ));
    }

    #[test]
    fn declared_slider_value_is_snapped() {
        let mut panel = ControlPanel::new();
        panel.add_folder("f").slider("s", "S", 12.0, 0.0, 10.0, 0.5);
        assert_eq!(panel.slider("s"), Some(10.0));
    }
}
