use utoipa::{IntoParams, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub version: String }

#[derive(ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct CreateCustomerDoc {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; `null` clears an optional field.
#[derive(ToSchema)]
pub struct UpdateCustomerDoc {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
pub struct CreateBankAccountDoc {
    pub bank_name: String,
    pub account_name: String,
    /// Digits only, 4 to 34 of them.
    pub account_number: String,
    /// ISO-4217 code, e.g. `EUR`.
    pub currency: String,
    pub swift: Option<String>,
    pub iban: Option<String>,
    pub customer_id: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(ToSchema)]
pub struct UpdateBankAccountDoc {
    pub bank_name: Option<String>,
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub currency: Option<String>,
    pub swift: Option<String>,
    pub iban: Option<String>,
    pub customer_id: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(ToSchema)]
pub struct CreateServiceDoc {
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    /// Minor currency units.
    pub unit_price: i64,
    pub tax_percent: Option<i32>,
    pub active: Option<bool>,
}

#[derive(ToSchema)]
pub struct UpdateServiceDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub unit_price: Option<i64>,
    pub tax_percent: Option<i32>,
    pub active: Option<bool>,
}

#[derive(ToSchema)]
pub struct CreateInvoiceDoc {
    pub invoice_number: String,
    pub customer_id: String,
    pub bank_account_id: Option<String>,
    pub service_id: Option<String>,
    pub quantity: Option<i32>,
    pub amount: i64,
    pub currency: String,
    /// draft, sent, paid, overdue or cancelled
    pub status: Option<String>,
    /// RFC 3339 timestamp
    pub issue_date: String,
    pub due_date: String,
    pub paid_at: Option<String>,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
pub struct UpdateInvoiceDoc {
    pub invoice_number: Option<String>,
    pub customer_id: Option<String>,
    pub bank_account_id: Option<String>,
    pub service_id: Option<String>,
    pub quantity: Option<i32>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub paid_at: Option<String>,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
pub struct UpdateUserDoc {
    pub email: Option<String>,
    pub name: Option<String>,
    /// admin or member
    pub role: Option<String>,
    /// active or disabled
    pub status: Option<String>,
}

#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQueryDoc {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
}

#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BankAccountQueryDoc {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub customer_id: Option<String>,
}

#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ServiceQueryDoc {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub active: Option<bool>,
}

#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceQueryDoc {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub customer_id: Option<String>,
}

#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityQueryDoc {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub entity: Option<String>,
    pub user_id: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::customers::create_customer,
        crate::routes::customers::list_customers,
        crate::routes::customers::get_customer,
        crate::routes::customers::update_customer,
        crate::routes::customers::delete_customer,
        crate::routes::bank_accounts::create_bank_account,
        crate::routes::bank_accounts::list_bank_accounts,
        crate::routes::bank_accounts::get_bank_account,
        crate::routes::bank_accounts::update_bank_account,
        crate::routes::bank_accounts::delete_bank_account,
        crate::routes::services::create_service,
        crate::routes::services::list_services,
        crate::routes::services::get_service,
        crate::routes::services::update_service,
        crate::routes::services::delete_service,
        crate::routes::invoices::create_invoice,
        crate::routes::invoices::list_invoices,
        crate::routes::invoices::get_invoice,
        crate::routes::invoices::update_invoice,
        crate::routes::invoices::delete_invoice,
        crate::routes::admin::list_users,
        crate::routes::admin::get_user,
        crate::routes::admin::update_user,
        crate::routes::admin::delete_user,
        crate::routes::admin::list_activity_logs,
        crate::routes::admin::list_trash,
        crate::routes::admin::restore,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            CreateCustomerDoc,
            UpdateCustomerDoc,
            CreateBankAccountDoc,
            UpdateBankAccountDoc,
            CreateServiceDoc,
            UpdateServiceDoc,
            CreateInvoiceDoc,
            UpdateInvoiceDoc,
            UpdateUserDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "customers"),
        (name = "bank-accounts"),
        (name = "services"),
        (name = "invoices"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
