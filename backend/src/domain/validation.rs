//! Form validation for the farm records.
//!
//! Every record form validates to a [`FieldErrors`] map keyed by the form's
//! wire field names. A form only turns into a record when no flag is set; there
//! is no partial commit.
//!
//! ## Rules
//!
//! - Text fields must be non-blank
//! - Supply quantity and cost must parse as non-negative numbers
//! - Sale quantity must be a positive whole number, total value non-negative
//! - Lot color must be a hex color (`#rgb` or `#rrggbb`)
//! - Sex must be selected on cattle and sale forms
//!
//! The sale form additionally keeps its flags between edits: touching a field
//! clears that field's flag only, and a successful submission resets the form.

use chrono::{DateTime, NaiveDate, Utc};
use shared::{
    Buyer, BuyerForm, Cattle, CattleForm, Employee, EmployeeForm, FarmRecord, FieldErrors,
    LoginForm, Lot, LotForm, PasswordResetForm, RegistrationForm, Sale, SaleForm, SaleFormEdit,
    SaleFormState, Supply, SupplyForm,
};

/// Minimum password length on the registration form
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A form that validates into a record of one collection
pub trait RecordForm {
    type Record: FarmRecord;

    /// Toast shown after the record is created
    const CREATED_MESSAGE: &'static str;

    /// Flag every field of the form
    fn field_errors(&self) -> FieldErrors;

    /// Turn the form into a record with the given identity, or return the flags
    fn build(&self, id: String, created_at: DateTime<Utc>) -> Result<Self::Record, FieldErrors>;

    /// Replace every field of `existing`, keeping its id and creation time
    fn apply_to(&self, existing: &Self::Record) -> Result<Self::Record, FieldErrors> {
        self.build(existing.id().to_string(), existing.created_at())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn parse_non_negative(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

fn parse_positive_count(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

fn is_hex_color(value: &str) -> bool {
    let value = value.trim();
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn finish<T>(errors: FieldErrors, build: impl FnOnce() -> Option<T>) -> Result<T, FieldErrors> {
    if errors.has_errors() {
        return Err(errors);
    }
    build().ok_or(errors)
}

impl RecordForm for CattleForm {
    type Record = Cattle;
    const CREATED_MESSAGE: &'static str = "Cattle registered successfully!";

    fn field_errors(&self) -> FieldErrors {
        FieldErrors::from_flags([
            ("number", is_blank(&self.number)),
            ("sex", self.sex.is_none()),
            ("lot", is_blank(&self.lot)),
        ])
    }

    fn build(&self, id: String, created_at: DateTime<Utc>) -> Result<Cattle, FieldErrors> {
        finish(self.field_errors(), || {
            Some(Cattle {
                id,
                number: self.number.trim().to_string(),
                sex: self.sex?,
                lot: self.lot.trim().to_string(),
                created_at,
            })
        })
    }
}

impl RecordForm for BuyerForm {
    type Record = Buyer;
    const CREATED_MESSAGE: &'static str = "Buyer registered successfully!";

    fn field_errors(&self) -> FieldErrors {
        FieldErrors::from_flags([
            ("name", is_blank(&self.name)),
            ("contact", is_blank(&self.contact)),
        ])
    }

    fn build(&self, id: String, created_at: DateTime<Utc>) -> Result<Buyer, FieldErrors> {
        finish(self.field_errors(), || {
            Some(Buyer {
                id,
                name: self.name.trim().to_string(),
                contact: self.contact.trim().to_string(),
                created_at,
            })
        })
    }
}

impl RecordForm for SupplyForm {
    type Record = Supply;
    const CREATED_MESSAGE: &'static str = "Supply registered successfully!";

    fn field_errors(&self) -> FieldErrors {
        FieldErrors::from_flags([
            ("name", is_blank(&self.name)),
            ("quantity", parse_non_negative(&self.quantity).is_none()),
            ("unit", is_blank(&self.unit)),
            ("cost", parse_non_negative(&self.cost).is_none()),
        ])
    }

    fn build(&self, id: String, created_at: DateTime<Utc>) -> Result<Supply, FieldErrors> {
        finish(self.field_errors(), || {
            Some(Supply {
                id,
                name: self.name.trim().to_string(),
                supply_type: self.supply_type,
                quantity: parse_non_negative(&self.quantity)?,
                unit: self.unit.trim().to_string(),
                cost: parse_non_negative(&self.cost)?,
                created_at,
            })
        })
    }
}

impl RecordForm for EmployeeForm {
    type Record = Employee;
    const CREATED_MESSAGE: &'static str = "Employee registered successfully!";

    fn field_errors(&self) -> FieldErrors {
        FieldErrors::from_flags([("name", is_blank(&self.name))])
    }

    fn build(&self, id: String, created_at: DateTime<Utc>) -> Result<Employee, FieldErrors> {
        finish(self.field_errors(), || {
            Some(Employee {
                id,
                name: self.name.trim().to_string(),
                created_at,
            })
        })
    }
}

impl RecordForm for LotForm {
    type Record = Lot;
    const CREATED_MESSAGE: &'static str = "Lot created successfully!";

    fn field_errors(&self) -> FieldErrors {
        FieldErrors::from_flags([
            ("name", is_blank(&self.name)),
            ("color", !is_hex_color(&self.color)),
        ])
    }

    fn build(&self, id: String, created_at: DateTime<Utc>) -> Result<Lot, FieldErrors> {
        finish(self.field_errors(), || {
            Some(Lot {
                id,
                name: self.name.trim().to_string(),
                color: self.color.trim().to_string(),
                created_at,
            })
        })
    }
}

impl RecordForm for SaleForm {
    type Record = Sale;
    const CREATED_MESSAGE: &'static str = "Sale recorded successfully!";

    fn field_errors(&self) -> FieldErrors {
        FieldErrors::from_flags([
            ("lot", is_blank(&self.lot)),
            ("sex", self.sex.is_none()),
            ("quantity", parse_positive_count(&self.quantity).is_none()),
            ("buyerId", is_blank(&self.buyer_id)),
            ("employeeId", is_blank(&self.employee_id)),
            ("totalValue", parse_non_negative(&self.total_value).is_none()),
        ])
    }

    fn build(&self, id: String, created_at: DateTime<Utc>) -> Result<Sale, FieldErrors> {
        finish(self.field_errors(), || {
            Some(Sale {
                id,
                lot: self.lot.trim().to_string(),
                sex: self.sex?,
                quantity: parse_positive_count(&self.quantity)?,
                buyer_id: self.buyer_id.trim().to_string(),
                employee_id: self.employee_id.trim().to_string(),
                date: self.date,
                is_fed: self.is_fed,
                is_vaccinated: self.is_vaccinated,
                total_value: parse_non_negative(&self.total_value)?,
                created_at,
            })
        })
    }
}

/// Apply one user edit to the sale form, clearing only that field's flag
pub fn apply_sale_edit(state: &mut SaleFormState, edit: SaleFormEdit) {
    state.errors.clear(edit.field());

    let form = &mut state.form;
    match edit {
        SaleFormEdit::Lot(value) => form.lot = value,
        SaleFormEdit::Sex(value) => form.sex = value,
        SaleFormEdit::Quantity(value) => form.quantity = value,
        SaleFormEdit::BuyerId(value) => form.buyer_id = value,
        SaleFormEdit::EmployeeId(value) => form.employee_id = value,
        SaleFormEdit::Date(value) => form.date = value,
        SaleFormEdit::IsFed(value) => form.is_fed = value,
        SaleFormEdit::IsVaccinated(value) => form.is_vaccinated = value,
        SaleFormEdit::TotalValue(value) => form.total_value = value,
    }
}

/// Blank the sale form after a successful submission
pub fn reset_sale_form(state: &mut SaleFormState, today: NaiveDate) {
    state.form = SaleForm::new(today);
    state.errors.reset();
}

/// Failures of the login, registration and password reset forms
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Please fill in all fields")]
    MissingFields,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },
}

pub fn validate_login(form: &LoginForm) -> Result<(), CredentialError> {
    if is_blank(&form.username) || form.password.is_empty() {
        return Err(CredentialError::MissingFields);
    }
    Ok(())
}

pub fn validate_registration(form: &RegistrationForm) -> Result<(), CredentialError> {
    let missing = [&form.name, &form.email, &form.username]
        .iter()
        .any(|value| is_blank(value))
        || form.password.is_empty()
        || form.confirm_password.is_empty();
    if missing {
        return Err(CredentialError::MissingFields);
    }
    if form.password != form.confirm_password {
        return Err(CredentialError::PasswordMismatch);
    }
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CredentialError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

pub fn validate_password_reset(form: &PasswordResetForm) -> Result<(), CredentialError> {
    if is_blank(&form.username) || form.new_password.is_empty() || form.confirm_password.is_empty() {
        return Err(CredentialError::MissingFields);
    }
    if form.new_password != form.confirm_password {
        return Err(CredentialError::PasswordMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Sex, SupplyType};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 13).unwrap()
    }

    fn valid_sale_form() -> SaleForm {
        SaleForm {
            lot: "A".to_string(),
            sex: Some(Sex::Female),
            quantity: "5".to_string(),
            buyer_id: "buyer-1".to_string(),
            employee_id: "employee-1".to_string(),
            date: today(),
            is_fed: true,
            is_vaccinated: true,
            total_value: "1000".to_string(),
        }
    }

    #[test]
    fn test_cattle_form_presence_rules() {
        let form = CattleForm {
            number: "  ".to_string(),
            sex: None,
            lot: "A".to_string(),
        };
        let errors = form.field_errors();
        assert!(errors.is_invalid("number"));
        assert!(errors.is_invalid("sex"));
        assert!(!errors.is_invalid("lot"));
        assert!(form.build("id".to_string(), Utc::now()).is_err());

        let form = CattleForm {
            number: " 0042 ".to_string(),
            sex: Some(Sex::Male),
            lot: "A".to_string(),
        };
        let cattle = form.build("id".to_string(), Utc::now()).unwrap();
        assert_eq!(cattle.number, "0042");
        assert_eq!(cattle.sex, Sex::Male);
    }

    #[test]
    fn test_supply_form_rejects_bad_numbers() {
        let form = SupplyForm {
            name: "Salt".to_string(),
            supply_type: SupplyType::Feed,
            quantity: "-3".to_string(),
            unit: "kg".to_string(),
            cost: "abc".to_string(),
        };
        let errors = form.field_errors();
        assert!(errors.is_invalid("quantity"));
        assert!(errors.is_invalid("cost"));
        assert!(!errors.is_invalid("name"));
        assert!(!errors.is_invalid("unit"));

        let form = SupplyForm {
            quantity: "10".to_string(),
            cost: "2,50".to_string(),
            ..form
        };
        let supply = form.build("id".to_string(), Utc::now()).unwrap();
        assert_eq!(supply.quantity, 10.0);
        assert_eq!(supply.cost, 2.5);
        assert_eq!(supply.total_cost(), 25.0);
    }

    #[test]
    fn test_supply_form_defaults() {
        let form = SupplyForm::default();
        assert_eq!(form.unit, "kg");
        assert_eq!(form.supply_type, SupplyType::Feed);
    }

    #[test]
    fn test_sale_missing_buyer_flags_only_buyer() {
        let form = SaleForm {
            buyer_id: String::new(),
            ..valid_sale_form()
        };

        let errors = form.build("id".to_string(), Utc::now()).unwrap_err();
        assert!(errors.is_invalid("buyerId"));
        for field in ["lot", "sex", "quantity", "employeeId", "totalValue"] {
            assert!(!errors.is_invalid(field), "{} should be valid", field);
        }
        assert_eq!(errors.invalid_fields(), vec!["buyerId"]);
    }

    #[test]
    fn test_sale_quantity_must_be_positive_whole_number() {
        for quantity in ["0", "2.5", "-1", ""] {
            let form = SaleForm {
                quantity: quantity.to_string(),
                ..valid_sale_form()
            };
            assert!(form.field_errors().is_invalid("quantity"), "{:?} accepted", quantity);
        }
    }

    #[test]
    fn test_lot_color_must_be_hex() {
        let form = LotForm {
            name: "B".to_string(),
            color: "green".to_string(),
        };
        assert!(form.field_errors().is_invalid("color"));

        let form = LotForm {
            color: "#0f0".to_string(),
            ..form
        };
        assert!(!form.field_errors().has_errors());
    }

    #[test]
    fn test_apply_to_keeps_identity() {
        let created_at = Utc::now();
        let original = BuyerForm {
            name: "Old".to_string(),
            contact: "111".to_string(),
        }
        .build("buyer-1".to_string(), created_at)
        .unwrap();

        let updated = BuyerForm {
            name: "New".to_string(),
            contact: "222".to_string(),
        }
        .apply_to(&original)
        .unwrap();

        assert_eq!(updated.id, "buyer-1");
        assert_eq!(updated.created_at, created_at);
        assert_eq!(updated.name, "New");
    }

    #[test]
    fn test_sale_edit_clears_only_touched_field() {
        let mut state = SaleFormState {
            form: SaleForm::new(today()),
            errors: SaleForm::new(today()).field_errors(),
        };
        assert!(state.errors.is_invalid("lot"));
        assert!(state.errors.is_invalid("buyerId"));

        apply_sale_edit(&mut state, SaleFormEdit::Lot("A".to_string()));
        assert_eq!(state.form.lot, "A");
        assert!(!state.errors.is_invalid("lot"));
        assert!(state.errors.is_invalid("buyerId"));
        assert!(state.errors.is_invalid("quantity"));

        // Clearing happens on touch, even if the new value is still empty
        apply_sale_edit(&mut state, SaleFormEdit::BuyerId(String::new()));
        assert!(!state.errors.is_invalid("buyerId"));
        assert!(state.errors.is_invalid("employeeId"));
    }

    #[test]
    fn test_every_sale_edit_clears_its_own_flag() {
        let all_flagged = SaleForm::new(today()).field_errors();
        let flagged_fields = all_flagged.invalid_fields();
        assert_eq!(
            flagged_fields,
            vec!["buyerId", "employeeId", "lot", "quantity", "sex", "totalValue"]
        );

        let edits = vec![
            (SaleFormEdit::Lot("A".to_string()), Some("lot")),
            (SaleFormEdit::Sex(Some(Sex::Male)), Some("sex")),
            (SaleFormEdit::Quantity("3".to_string()), Some("quantity")),
            (SaleFormEdit::BuyerId("buyer-1".to_string()), Some("buyerId")),
            (SaleFormEdit::EmployeeId("employee-1".to_string()), Some("employeeId")),
            (SaleFormEdit::TotalValue("10".to_string()), Some("totalValue")),
            (SaleFormEdit::Date(today()), None),
            (SaleFormEdit::IsFed(true), None),
            (SaleFormEdit::IsVaccinated(true), None),
        ];

        for (edit, cleared) in edits {
            let field = edit.field();
            let mut state = SaleFormState {
                form: SaleForm::new(today()),
                errors: all_flagged.clone(),
            };

            apply_sale_edit(&mut state, edit);

            let expected: Vec<&str> = flagged_fields
                .iter()
                .copied()
                .filter(|flagged| Some(*flagged) != cleared)
                .collect();
            assert_eq!(state.errors.invalid_fields(), expected, "after editing {}", field);
            assert_eq!(cleared.is_some(), flagged_fields.contains(&field), "flag key for {}", field);
        }
    }

    #[test]
    fn test_reset_sale_form() {
        let mut state = SaleFormState {
            form: valid_sale_form(),
            errors: FieldErrors::from_flags([("lot", true)]),
        };
        let tomorrow = today().succ_opt().unwrap();

        reset_sale_form(&mut state, tomorrow);
        assert_eq!(state.form, SaleForm::new(tomorrow));
        assert!(!state.errors.has_errors());
    }

    #[test]
    fn test_registration_rules() {
        let mut form = RegistrationForm {
            name: "Ana".to_string(),
            email: "ana@farm.test".to_string(),
            username: "ana".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        assert_eq!(validate_registration(&form), Ok(()));

        form.confirm_password = "secret2".to_string();
        assert_eq!(validate_registration(&form), Err(CredentialError::PasswordMismatch));

        form.password = "abc".to_string();
        form.confirm_password = "abc".to_string();
        assert_eq!(
            validate_registration(&form),
            Err(CredentialError::PasswordTooShort { min: 6 })
        );

        form.email = String::new();
        assert_eq!(validate_registration(&form), Err(CredentialError::MissingFields));
    }

    #[test]
    fn test_password_reset_has_no_length_rule() {
        let form = PasswordResetForm {
            username: "ana".to_string(),
            new_password: "abc".to_string(),
            confirm_password: "abc".to_string(),
        };
        assert_eq!(validate_password_reset(&form), Ok(()));

        let form = PasswordResetForm {
            confirm_password: "abd".to_string(),
            ..form
        };
        assert_eq!(validate_password_reset(&form), Err(CredentialError::PasswordMismatch));
    }

    #[test]
    fn test_login_requires_both_fields() {
        assert_eq!(validate_login(&LoginForm::default()), Err(CredentialError::MissingFields));
        let form = LoginForm {
            username: "ana".to_string(),
            password: "x".to_string(),
        };
        assert_eq!(validate_login(&form), Ok(()));
    }
}
