use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder rendered when a by-value or by-id reference has no matching record
pub const MISSING_REFERENCE: &str = "N/A";

/// The six record collections addressed by the repository layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Cattle,
    Buyers,
    Supplies,
    Employees,
    Sales,
    Lots,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 6] = [
        CollectionKind::Cattle,
        CollectionKind::Buyers,
        CollectionKind::Supplies,
        CollectionKind::Employees,
        CollectionKind::Sales,
        CollectionKind::Lots,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Cattle => "cattle",
            CollectionKind::Buyers => "buyers",
            CollectionKind::Supplies => "supplies",
            CollectionKind::Employees => "employees",
            CollectionKind::Sales => "sales",
            CollectionKind::Lots => "lots",
        }
    }

    /// Fixed key used by local stores, e.g. "ruraltech_cattle"
    pub fn storage_key(&self) -> String {
        format!("ruraltech_{}", self.as_str())
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sex of an animal (cattle record or sold batch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

/// Kind of supply; older data files use the Portuguese labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyType {
    #[serde(alias = "ração")]
    Feed,
    #[serde(alias = "medicamento")]
    Medicine,
}

impl Default for SupplyType {
    fn default() -> Self {
        SupplyType::Feed
    }
}

impl fmt::Display for SupplyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupplyType::Feed => f.write_str("feed"),
            SupplyType::Medicine => f.write_str("medicine"),
        }
    }
}

/// A single head of cattle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cattle {
    pub id: String,
    /// Ear tag / registration number
    pub number: String,
    pub sex: Sex,
    /// Name of the lot this animal belongs to (by value, not by id)
    pub lot: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub created_at: DateTime<Utc>,
}

/// A purchased supply (feed or medicine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supply {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub supply_type: SupplyType,
    pub quantity: f64,
    pub unit: String,
    /// Cost per unit
    pub cost: f64,
    pub created_at: DateTime<Utc>,
}

impl Supply {
    /// Total cost of the purchase; always derived, never stored
    pub fn total_cost(&self) -> f64 {
        self.cost * self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A sale of a batch of animals out of a lot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub lot: String,
    pub sex: Sex,
    /// Number of head sold
    pub quantity: u32,
    pub buyer_id: String,
    pub employee_id: String,
    /// Date of the sale as entered by the user (ISO 8601 date)
    pub date: NaiveDate,
    pub is_fed: bool,
    pub is_vaccinated: bool,
    pub total_value: f64,
    pub created_at: DateTime<Utc>,
}

/// A named, colored grouping label for cattle and sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: String,
    pub name: String,
    /// Hex color, e.g. "#10b981"
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Common shape of every persisted record
pub trait FarmRecord: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection this record type is stored in
    const KIND: CollectionKind;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;
}

macro_rules! farm_record {
    ($record:ty, $kind:expr) => {
        impl FarmRecord for $record {
            const KIND: CollectionKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
        }
    };
}

farm_record!(Cattle, CollectionKind::Cattle);
farm_record!(Buyer, CollectionKind::Buyers);
farm_record!(Supply, CollectionKind::Supplies);
farm_record!(Employee, CollectionKind::Employees);
farm_record!(Sale, CollectionKind::Sales);
farm_record!(Lot, CollectionKind::Lots);

/// Generate a new record ID (UUID v4)
pub fn generate_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Form input for registering a head of cattle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CattleForm {
    pub number: String,
    pub sex: Option<Sex>,
    pub lot: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuyerForm {
    pub name: String,
    pub contact: String,
}

/// Form input for a supply purchase; numbers arrive as raw text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupplyForm {
    pub name: String,
    #[serde(rename = "type")]
    pub supply_type: SupplyType,
    pub quantity: String,
    pub unit: String,
    pub cost: String,
}

impl Default for SupplyForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            supply_type: SupplyType::Feed,
            quantity: String::new(),
            unit: "kg".to_string(),
            cost: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeForm {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LotForm {
    pub name: String,
    pub color: String,
}

impl Default for LotForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: "#10b981".to_string(),
        }
    }
}

/// Form input for registering a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleForm {
    pub lot: String,
    pub sex: Option<Sex>,
    pub quantity: String,
    pub buyer_id: String,
    pub employee_id: String,
    pub date: NaiveDate,
    pub is_fed: bool,
    pub is_vaccinated: bool,
    pub total_value: String,
}

impl SaleForm {
    /// Blank form with the sale date set to `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            lot: String::new(),
            sex: None,
            quantity: String::new(),
            buyer_id: String::new(),
            employee_id: String::new(),
            date: today,
            is_fed: false,
            is_vaccinated: false,
            total_value: String::new(),
        }
    }
}

impl Default for SaleForm {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

/// Per-field "is invalid" flags produced by form validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, bool>);

impl FieldErrors {
    pub fn from_flags<'a>(flags: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        Self(
            flags
                .into_iter()
                .map(|(field, invalid)| (field.to_string(), invalid))
                .collect(),
        )
    }

    /// Unknown fields are reported as valid
    pub fn is_invalid(&self, field: &str) -> bool {
        self.0.get(field).copied().unwrap_or(false)
    }

    pub fn has_errors(&self) -> bool {
        self.0.values().any(|invalid| *invalid)
    }

    /// Clear a single field's flag, leaving every other flag untouched
    pub fn clear(&mut self, field: &str) {
        if let Some(flag) = self.0.get_mut(field) {
            *flag = false;
        }
    }

    /// Set every flag back to false
    pub fn reset(&mut self) {
        self.0.values_mut().for_each(|flag| *flag = false);
    }

    pub fn invalid_fields(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, invalid)| **invalid)
            .map(|(field, _)| field.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(field, invalid)| (field.as_str(), *invalid))
    }
}

/// Sale form together with its error flags, kept between edits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaleFormState {
    pub form: SaleForm,
    pub errors: FieldErrors,
}

/// A single user edit to the sale form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum SaleFormEdit {
    Lot(String),
    Sex(Option<Sex>),
    Quantity(String),
    BuyerId(String),
    EmployeeId(String),
    Date(NaiveDate),
    IsFed(bool),
    IsVaccinated(bool),
    TotalValue(String),
}

impl SaleFormEdit {
    /// Wire name of the field this edit touches
    pub fn field(&self) -> &'static str {
        match self {
            SaleFormEdit::Lot(_) => "lot",
            SaleFormEdit::Sex(_) => "sex",
            SaleFormEdit::Quantity(_) => "quantity",
            SaleFormEdit::BuyerId(_) => "buyerId",
            SaleFormEdit::EmployeeId(_) => "employeeId",
            SaleFormEdit::Date(_) => "date",
            SaleFormEdit::IsFed(_) => "isFed",
            SaleFormEdit::IsVaccinated(_) => "isVaccinated",
            SaleFormEdit::TotalValue(_) => "totalValue",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordResetForm {
    pub username: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Partial date used by the day/month/year filters; omitted parts are unconstrained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatePattern {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl DatePattern {
    pub fn is_empty(&self) -> bool {
        self.day.is_none() && self.month.is_none() && self.year.is_none()
    }
}

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// Sales whose date falls in the reference month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySalesReport {
    pub total_sales: usize,
    pub total_quantity: u64,
    pub total_revenue: f64,
    pub sales: Vec<Sale>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplyTypeTotals {
    pub quantity: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostsReport {
    pub total_costs: f64,
    pub feed_costs: f64,
    pub medicine_costs: f64,
    pub by_type: BTreeMap<SupplyType, SupplyTypeTotals>,
}

/// Head count of one lot in the herd report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotHeadCount {
    pub lot: String,
    pub count: usize,
    /// Share of the whole herd, one decimal
    pub percentage: f64,
    /// Color of the lot with this name; `None` when no such lot exists
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HerdReport {
    pub total: usize,
    pub by_lot: Vec<LotHeadCount>,
}

/// Sale enriched with its buyer's name for dashboard display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSale {
    pub sale: Sale,
    pub buyer_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_cattle: usize,
    pub monthly_sales: usize,
    pub monthly_revenue: f64,
    pub total_costs: f64,
    pub herd: HerdReport,
    pub recent_sales: Vec<RecentSale>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSale {
    pub sale: Sale,
    pub buyer_name: String,
    pub employee_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSupply {
    pub supply: Supply,
    pub total_cost: f64,
}

/// Everything a printable report needs: aggregates plus the raw records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmReport {
    pub generated_on: NaiveDate,
    pub monthly_sales: MonthlySalesReport,
    pub costs: CostsReport,
    pub herd: HerdReport,
    pub sales: Vec<ReportSale>,
    pub supplies: Vec<ReportSupply>,
}

/// Outcome of checking a login, registration or password reset form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialCheckResponse {
    pub success: bool,
    pub message: String,
}

/// Request to start a session for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub user_id: String,
}

/// Result of a lot deletion request that passed the in-use guard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LotDeletionOutcome {
    /// Guard passed; repeat the request with `confirmed = true` to delete
    ConfirmationRequired { lot: Lot },
    Deleted { lot: Lot },
}

/// Body returned when a form submission is rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailureResponse {
    pub message: String,
    pub errors: FieldErrors,
}

/// Body returned when a lot cannot be deleted because cattle still reference it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotInUseResponse {
    pub message: String,
    pub lot: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusResponse {
    pub pending: Vec<CollectionKind>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_supply_total_cost_is_derived() {
        let supply = Supply {
            id: generate_record_id(),
            name: "Corn silage".to_string(),
            supply_type: SupplyType::Feed,
            quantity: 12.5,
            unit: "kg".to_string(),
            cost: 4.0,
            created_at: Utc::now(),
        };
        assert_eq!(supply.total_cost(), 50.0);

        let json = serde_json::to_value(&supply).unwrap();
        assert!(json.get("totalCost").is_none());
        assert_eq!(json["type"], "feed");
    }

    #[test]
    fn test_sale_wire_names() {
        let sale = Sale {
            id: "s1".to_string(),
            lot: "A".to_string(),
            sex: Sex::Male,
            quantity: 3,
            buyer_id: "b1".to_string(),
            employee_id: "e1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 13).unwrap(),
            is_fed: true,
            is_vaccinated: false,
            total_value: 4500.0,
            created_at: Utc.with_ymd_and_hms(2025, 6, 13, 9, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["buyerId"], "b1");
        assert_eq!(json["employeeId"], "e1");
        assert_eq!(json["isFed"], true);
        assert_eq!(json["isVaccinated"], false);
        assert_eq!(json["totalValue"], 4500.0);
        assert_eq!(json["date"], "2025-06-13");
        assert_eq!(json["sex"], "male");

        let back: Sale = serde_json::from_value(json).unwrap();
        assert_eq!(back, sale);
    }

    #[test]
    fn test_legacy_supply_labels_decode() {
        let raw = r#"{"id":"1718000000000","name":"Vermifugo","type":"medicamento",
            "quantity":2,"unit":"L","cost":35.5,"createdAt":"2024-06-10T12:00:00.000Z"}"#;
        let supply: Supply = serde_json::from_str(raw).unwrap();
        assert_eq!(supply.supply_type, SupplyType::Medicine);

        let feed: SupplyType = serde_json::from_str("\"ração\"").unwrap();
        assert_eq!(feed, SupplyType::Feed);
    }

    #[test]
    fn test_field_errors_clear_and_reset() {
        let mut errors = FieldErrors::from_flags([("lot", true), ("buyerId", true), ("quantity", false)]);
        assert!(errors.has_errors());
        assert_eq!(errors.invalid_fields(), vec!["buyerId", "lot"]);

        errors.clear("lot");
        assert!(!errors.is_invalid("lot"));
        assert!(errors.is_invalid("buyerId"));

        errors.reset();
        assert!(!errors.has_errors());
        assert!(!errors.is_invalid("unknown"));
    }

    #[test]
    fn test_collection_kind_keys() {
        assert_eq!(CollectionKind::Cattle.storage_key(), "ruraltech_cattle");
        assert_eq!(CollectionKind::Supplies.to_string(), "supplies");
        assert_eq!(serde_json::to_string(&CollectionKind::Lots).unwrap(), "\"lots\"");
        assert_eq!(Sale::KIND, CollectionKind::Sales);
    }

    #[test]
    fn test_sale_form_edit_names_match_form_fields() {
        let edit = SaleFormEdit::BuyerId("b1".to_string());
        assert_eq!(edit.field(), "buyerId");

        let json = serde_json::to_value(&edit).unwrap();
        assert_eq!(json["field"], "buyerId");
        assert_eq!(json["value"], "b1");
    }
}
