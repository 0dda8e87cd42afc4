// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Modal transition state machine.
//
// One process-wide flag remembers whether the last animated push was modal.
// Only the modal push / modal finish pair (and an animated pop-as-modal
// creation) toggle it; everything else just reads it to pick an animation.

use cobalt_core::types::{PushStyle, Transition};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ModalState {
    active: bool,
}

impl ModalState {
    pub(crate) fn is_active(self) -> bool {
        self.active
    }

    /// A screen pushed with `style` has been created.
    pub(crate) fn on_created(&mut self, style: PushStyle, animated: bool) -> Transition {
        if !animated {
            return Transition::None;
        }
        match style {
            PushStyle::Modal => {
                self.active = true;
                Transition::ModalOpen
            }
            PushStyle::PopAsModal => {
                self.active = false;
                Transition::ModalClose
            }
            PushStyle::Normal if self.active => Transition::ModalPush,
            PushStyle::Normal => Transition::Default,
        }
    }

    /// A screen pushed with `style` is finishing.
    pub(crate) fn on_finishing(&mut self, style: PushStyle, animated: bool) -> Transition {
        if !animated {
            return Transition::None;
        }
        match style {
            PushStyle::Modal => {
                self.active = false;
                Transition::ModalClose
            }
            _ if self.active => Transition::ModalPop,
            _ => Transition::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modal_push_then_finish_closes() {
        let mut state = ModalState::default();
        assert_eq!(state.on_created(PushStyle::Modal, true), Transition::ModalOpen);
        assert!(state.is_active());
        assert_eq!(state.on_finishing(PushStyle::Modal, true), Transition::ModalClose);
        assert!(!state.is_active());
    }

    #[test]
    fn normal_screen_under_modal_uses_push_and_pop() {
        let mut state = ModalState::default();
        state.on_created(PushStyle::Modal, true);

        assert_eq!(state.on_created(PushStyle::Normal, true), Transition::ModalPush);
        assert_eq!(state.on_finishing(PushStyle::Normal, true), Transition::ModalPop);
        // Only the modal pair toggles the flag.
        assert!(state.is_active());
        assert_eq!(state.on_finishing(PushStyle::Normal, true), Transition::ModalPop);
    }

    #[test]
    fn normal_flow_uses_default() {
        let mut state = ModalState::default();
        assert_eq!(state.on_created(PushStyle::Normal, true), Transition::Default);
        assert_eq!(state.on_finishing(PushStyle::Normal, true), Transition::Default);
        assert!(!state.is_active());
    }

    #[test]
    fn non_animated_never_touches_the_flag() {
        let mut state = ModalState::default();
        assert_eq!(state.on_created(PushStyle::Modal, false), Transition::None);
        assert!(!state.is_active());

        state.on_created(PushStyle::Modal, true);
        assert_eq!(state.on_finishing(PushStyle::Modal, false), Transition::None);
        assert!(state.is_active());
    }

    #[test]
    fn pop_as_modal_clears_the_flag() {
        let mut state = ModalState::default();
        state.on_created(PushStyle::Modal, true);
        assert_eq!(state.on_created(PushStyle::PopAsModal, true), Transition::ModalClose);
        assert!(!state.is_active());
    }
}
