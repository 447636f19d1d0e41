//! Form descriptors returned by `GET` on form endpoints.
//!
//! Clients render their own forms; these descriptors say which fields each
//! form submits and which are mandatory.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ReportField;

/// Kind of input a field expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Number,
    Checkbox,
}

/// One submitted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FormField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FormField {
    const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// Description of a form: where it posts and what it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FormDescriptor {
    pub name: &'static str,
    pub method: &'static str,
    pub action: String,
    pub fields: Vec<FormField>,
}

/// Sign-in form.
pub fn login_form() -> FormDescriptor {
    FormDescriptor {
        name: "login",
        method: "POST",
        action: "/login".to_owned(),
        fields: vec![
            FormField::required("username", FieldKind::Text),
            FormField::required("password", FieldKind::Password),
        ],
    }
}

/// Sign-up form.
pub fn register_form() -> FormDescriptor {
    FormDescriptor {
        name: "register",
        method: "POST",
        action: "/register".to_owned(),
        fields: vec![
            FormField::required("username", FieldKind::Text),
            FormField::required("email", FieldKind::Email),
            FormField::required("password1", FieldKind::Password),
            FormField::required("password2", FieldKind::Password),
        ],
    }
}

/// Dashboard form creating a subscription.
pub fn create_subscription_form(action: String) -> FormDescriptor {
    let mut fields = vec![
        FormField::required("action", FieldKind::Text),
        FormField::required("city", FieldKind::Text),
        FormField::optional("period", FieldKind::Number),
    ];
    fields.extend(
        ReportField::ALL
            .into_iter()
            .filter(|field| *field != ReportField::IsActive)
            .map(|field| FormField::optional(field.as_str(), FieldKind::Checkbox)),
    );
    FormDescriptor {
        name: "create_subscription",
        method: "POST",
        action,
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn register_form_lists_both_password_fields() {
        let names: Vec<_> = register_form().fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["username", "email", "password1", "password2"]);
    }

    #[rstest]
    fn subscription_form_offers_every_report_flag() {
        let form = create_subscription_form("/user/ada".to_owned());
        assert_eq!(form.action, "/user/ada");
        assert!(form.fields.iter().any(|f| f.name == "wind_speed"));
        assert!(form.fields.iter().all(|f| f.name != "is_active"));
        assert_eq!(
            form.fields
                .iter()
                .filter(|f| f.kind == FieldKind::Checkbox)
                .count(),
            8
        );
    }
}
