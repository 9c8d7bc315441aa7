use crate::model::PreparedUpdate;

/// True when an operator turned notifications off for this update.
pub fn is_suppressed(update: &PreparedUpdate) -> bool {
    let options = update.override_options();
    options.is_notify_override() && !options.is_notify()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, OverrideOptions, Update, UpdateId};
    use crate::rpsl::RpslObject;

    fn with_options(notify_override: bool, notify: bool) -> PreparedUpdate {
        let obj = RpslObject::parse("mntner: A-MNT\n").unwrap();
        PreparedUpdate::new(
            Update::new(UpdateId(0), obj.clone()),
            None,
            Some(obj),
            Action::Create,
            OverrideOptions { notify_override, notify },
        )
    }

    #[test]
    fn only_override_without_notify_suppresses() {
        assert!(is_suppressed(&with_options(true, false)));
        assert!(!is_suppressed(&with_options(true, true)));
        assert!(!is_suppressed(&with_options(false, false)));
        assert!(!is_suppressed(&with_options(false, true)));
    }
}
