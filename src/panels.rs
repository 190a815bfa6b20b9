use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Closed,
    Open,
    Minimized,
}

impl PanelState {
    pub fn toggled(self) -> Self {
        match self {
            PanelState::Closed | PanelState::Minimized => PanelState::Open,
            PanelState::Open => PanelState::Closed,
        }
    }

    pub fn is_visible(self) -> bool {
        self != PanelState::Closed
    }
}

/// The assistant panel is not listed here: its state lives on
/// `Assistant` because closing it has to cancel pending replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Compose,
    Notifications,
    Chat,
}

/// Overlay panels. Transitions are plain setters.
#[derive(Debug, Default)]
pub struct Panels {
    states: HashMap<PanelKind, PanelState>,
}

impl Panels {
    pub fn get(&self, kind: PanelKind) -> PanelState {
        self.states.get(&kind).copied().unwrap_or_default()
    }

    pub fn set(&mut self, kind: PanelKind, state: PanelState) {
        self.states.insert(kind, state);
    }

    pub fn open(&mut self, kind: PanelKind) {
        self.set(kind, PanelState::Open);
    }

    pub fn close(&mut self, kind: PanelKind) {
        self.set(kind, PanelState::Closed);
    }

    pub fn minimize(&mut self, kind: PanelKind) {
        self.set(kind, PanelState::Minimized);
    }

    pub fn toggle(&mut self, kind: PanelKind) -> PanelState {
        let next = self.get(kind).toggled();
        self.set(kind, next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_cycle() {
        let mut panels = Panels::default();
        assert_eq!(panels.get(PanelKind::Chat), PanelState::Closed);
        assert_eq!(panels.toggle(PanelKind::Chat), PanelState::Open);
        panels.minimize(PanelKind::Chat);
        assert!(panels.get(PanelKind::Chat).is_visible());
        assert_eq!(panels.toggle(PanelKind::Chat), PanelState::Open);
        assert_eq!(panels.toggle(PanelKind::Chat), PanelState::Closed);
    }

    #[test]
    fn panels_are_independent() {
        let mut panels = Panels::default();
        panels.open(PanelKind::Compose);
        panels.minimize(PanelKind::Notifications);
        panels.close(PanelKind::Chat);
        assert_eq!(panels.get(PanelKind::Compose), PanelState::Open);
        assert_eq!(panels.get(PanelKind::Notifications), PanelState::Minimized);
        assert_eq!(panels.get(PanelKind::Chat), PanelState::Closed);
    }
}
