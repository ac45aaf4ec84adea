//! WAI-ARIA widget protocols.
//!
//! Each protocol checks the markup contract first, then activates the
//! widget, then polls for the post-condition the pattern promises:
//!
//! - button: accessible name and `button` role; toggle buttons flip `aria-pressed`
//! - popup: valid `aria-haspopup`; one more visible element with the popup role
//! - modal dialog: opens like a `dialog` popup, should declare `aria-modal`;
//!   Escape closes exactly one dialog

use crate::driver::AriaDriver;
use crate::locator::{IntoLocator, Locator};
use crate::result::{AriaError, AriaResult};
use crate::role::AriaRole;
use crate::script::PageScript;
use crate::session::{BrowserSession, ElementHandle, Key};
use crate::warning::{report, Warning, WarningSink};
use serde::Deserialize;

/// Visible modal dialogs
pub const OPEN_DIALOG_SELECTOR: &str = r#"[role="dialog"]:not([aria-hidden="true"])"#;

/// Reference for the accessible name requirement
pub const ACCNAME_REFERENCE: &str = "https://w3c.github.io/accname/";

/// Reference for the button pattern
pub const BUTTON_REFERENCE: &str = "https://w3c.github.io/aria-practices/#button";

/// Reference for `aria-haspopup`
pub const HASPOPUP_REFERENCE: &str = "https://www.w3.org/TR/wai-aria-1.1/#aria-haspopup";

/// Reference for modal dialogs
pub const MODAL_REFERENCE: &str = "https://www.w3.org/TR/wai-aria-practices-1.1/#h-dialog_modal";

/// Roles an `aria-haspopup` value may announce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupRole {
    /// `menu` (also announced by `true`)
    Menu,
    /// `listbox`
    Listbox,
    /// `tree`
    Tree,
    /// `grid`
    Grid,
    /// `dialog`
    Dialog,
}

impl PopupRole {
    /// Interpret an `aria-haspopup` value. `"true"` means `menu`; absent,
    /// `"false"` and unknown values announce no popup.
    #[must_use]
    pub fn from_haspopup(value: Option<&str>) -> Option<Self> {
        match value? {
            "true" | "menu" => Some(Self::Menu),
            "listbox" => Some(Self::Listbox),
            "tree" => Some(Self::Tree),
            "grid" => Some(Self::Grid),
            "dialog" => Some(Self::Dialog),
            _ => None,
        }
    }

    /// Role token
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Listbox => "listbox",
            Self::Tree => "tree",
            Self::Grid => "grid",
            Self::Dialog => "dialog",
        }
    }

    /// Selector for visible popups with this role
    #[must_use]
    pub fn visible_selector(&self) -> String {
        format!(r#"[role="{}"]:not([aria-hidden="true"])"#, self.as_str())
    }

    /// Corresponding ARIA role
    #[must_use]
    pub const fn role(&self) -> AriaRole {
        match self {
            Self::Menu => AriaRole::Menu,
            Self::Listbox => AriaRole::Listbox,
            Self::Tree => AriaRole::Tree,
            Self::Grid => AriaRole::Grid,
            Self::Dialog => AriaRole::Dialog,
        }
    }
}

impl std::fmt::Display for PopupRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs to the accessible name of a button
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameInputs {
    /// `aria-pressed`
    pub aria_pressed: Option<String>,
    /// `aria-label`
    pub aria_label: Option<String>,
    /// `aria-labelledby`
    pub aria_labelled_by: Option<String>,
    /// Rendered text
    pub inner_text: Option<String>,
}

impl NameInputs {
    /// Whether any source yields a non-blank name
    #[must_use]
    pub fn has_accessible_name(&self) -> bool {
        [&self.aria_label, &self.aria_labelled_by, &self.inner_text]
            .into_iter()
            .flatten()
            .any(|value| !value.trim().is_empty())
    }

    /// Toggle state when `aria-pressed` is exactly `true` or `false`
    #[must_use]
    pub fn pressed(&self) -> Option<bool> {
        match self.aria_pressed.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }
}

impl<S: BrowserSession> AriaDriver<S> {
    /// Activate a button, then wait for a toggle button to change state.
    ///
    /// The element must have an accessible name and the `button` role;
    /// otherwise the call fails with [`AriaError::InvalidMarkup`] before any
    /// focus or key event.
    pub async fn push_button(
        &self,
        locator: impl IntoLocator,
        warnings: &mut dyn WarningSink,
    ) -> AriaResult<()> {
        let locator = locator.into_locator()?;
        let element = self.resolver().select_one(&locator, warnings).await?;

        let inputs: NameInputs = serde_json::from_value(
            self.session()
                .execute(PageScript::NameInputs, std::slice::from_ref(&element))
                .await?,
        )?;
        if !inputs.has_accessible_name() {
            return Err(AriaError::invalid_markup(
                "Ensure that the target element has an accessible name",
                ACCNAME_REFERENCE,
            ));
        }
        if self.role_of(&element).await? != Some(AriaRole::Button) {
            return Err(AriaError::invalid_markup(
                "Target element is not a button",
                BUTTON_REFERENCE,
            ));
        }

        let pressed = inputs.pressed();
        self.touch_element(&element, &locator, warnings).await?;

        if let Some(pressed) = pressed {
            let expected = if pressed { "false" } else { "true" };
            let session = self.session();
            let element = &element;
            self.waiter()
                .wait_for("toggle button state changes", move || async move {
                    Ok(session.attribute(element, "aria-pressed").await?.as_deref() == Some(expected))
                })
                .await?;
        }
        Ok(())
    }

    /// Activate a popup trigger and wait for one more visible popup of the
    /// role its `aria-haspopup` announces
    pub async fn open_popup(
        &self,
        locator: impl IntoLocator,
        warnings: &mut dyn WarningSink,
    ) -> AriaResult<()> {
        let locator = locator.into_locator()?;
        let element = self.resolver().select_one(&locator, warnings).await?;
        let role = self.popup_role(&element).await?;
        self.open_popup_element(&element, &locator, role, warnings)
            .await
    }

    /// Open a modal dialog and check that an open dialog declares `aria-modal`
    pub async fn open_modal(
        &self,
        locator: impl IntoLocator,
        warnings: &mut dyn WarningSink,
    ) -> AriaResult<()> {
        let locator = locator.into_locator()?;
        let element = self.resolver().select_one(&locator, warnings).await?;
        let role = self.popup_role(&element).await?;
        if role != PopupRole::Dialog {
            return Err(AriaError::invalid_markup(
                "Specify `aria-haspopup=\"dialog\"` on the element that opens a modal dialog",
                HASPOPUP_REFERENCE,
            ));
        }
        self.open_popup_element(&element, &locator, role, warnings)
            .await?;

        let dialogs = self.resolver().resolve_css(OPEN_DIALOG_SELECTOR).await?;
        let modal_attrs = futures::future::try_join_all(
            dialogs
                .iter()
                .map(|dialog| self.session().attribute(dialog, "aria-modal")),
        )
        .await?;
        if !modal_attrs.iter().any(|value| value.as_deref() == Some("true")) {
            report(
                warnings,
                Warning::poor_semantics("Specify the `aria-modal` attribute introduced in ARIA 1.1")
                    .with_reference(MODAL_REFERENCE),
            );
        }
        Ok(())
    }

    /// Press Escape on the focused element and wait for one fewer open dialog.
    ///
    /// Fails with [`AriaError::ElementNotFound`] without sending a key when
    /// no dialog is open.
    pub async fn close_modal(&self) -> AriaResult<()> {
        let initial = self.count_visible(OPEN_DIALOG_SELECTOR).await?;
        if initial == 0 {
            return Err(AriaError::ElementNotFound {
                locator: OPEN_DIALOG_SELECTOR.to_string(),
            });
        }

        let target = self.session().active_element().await?;
        self.session().send_key(&target, Key::Escape).await?;

        let expected = initial - 1;
        self.waiter()
            .wait_for("modal dialog has closed", || async move {
                Ok(self.count_visible(OPEN_DIALOG_SELECTOR).await? == expected)
            })
            .await?;
        Ok(())
    }

    async fn popup_role(&self, element: &ElementHandle) -> AriaResult<PopupRole> {
        let value = self.session().attribute(element, "aria-haspopup").await?;
        PopupRole::from_haspopup(value.as_deref()).ok_or_else(|| {
            AriaError::invalid_markup(
                "Specify a valid value for the `aria-haspopup` attribute",
                HASPOPUP_REFERENCE,
            )
        })
    }

    async fn open_popup_element(
        &self,
        element: &ElementHandle,
        locator: &Locator,
        role: PopupRole,
        warnings: &mut dyn WarningSink,
    ) -> AriaResult<()> {
        let selector = role.visible_selector();
        let initial = self.count_visible(&selector).await?;
        tracing::debug!(role = %role, initial, "opening popup");

        self.touch_element(element, locator, warnings).await?;

        let expected = initial + 1;
        let selector = selector.as_str();
        self.waiter()
            .wait_for(&format!("{role} popup has opened"), || async move {
                Ok(self.count_visible(selector).await? == expected)
            })
            .await?;
        Ok(())
    }

    async fn count_visible(&self, selector: &str) -> AriaResult<usize> {
        Ok(self.resolver().resolve_css(selector).await?.len())
    }
}
