//! Modal forms: a flat list of fields plus the inline errors of the last
//! submit. Each builder below knows how to fill one from a view and how to
//! read it back into the typed form the view validates.
use admin_core::{
    FieldErrors, FormMode,
    validation::{
        CashierForm, MARGIN_OPTIONS, PasswordResetForm, ShopForm, ShopOwnerForm, UserForm,
    },
    views::{
        catalog::ShopCatalog,
        game_results::GameResultQuery,
        reports::{DateRange, ReportsView},
        shops::OwnerOption,
        slips::SlipQuery,
    },
};
use api_types::{auth::Role, cashier::Cashier, shop::Shop, shop_owner::ShopOwner};
use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Secret,
    Digits,
    Choice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub choices: Vec<Choice>,
}

impl FormField {
    fn text(key: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            label,
            kind: FieldKind::Text,
            value: value.into(),
            choices: Vec::new(),
        }
    }

    fn secret(key: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Secret,
            ..Self::text(key, label, "")
        }
    }

    fn digits(key: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Digits,
            ..Self::text(key, label, value)
        }
    }

    fn choice(
        key: &'static str,
        label: &'static str,
        value: impl Into<String>,
        choices: Vec<Choice>,
    ) -> Self {
        Self {
            kind: FieldKind::Choice,
            choices,
            ..Self::text(key, label, value)
        }
    }

    /// What the modal shows for this field.
    pub fn display(&self) -> String {
        match self.kind {
            FieldKind::Secret => "•".repeat(self.value.chars().count()),
            FieldKind::Choice => self
                .choices
                .iter()
                .find(|choice| choice.value == self.value)
                .map(|choice| choice.label.clone())
                .unwrap_or_else(|| self.value.clone()),
            FieldKind::Text | FieldKind::Digits => self.value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    ShopOwner(FormMode),
    Shop(FormMode),
    Cashier(FormMode),
    User,
    ResetPassword { id: String, full_name: String },
    GameResultQuery,
    SlipQuery,
    ReportFilters,
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub title: String,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub errors: FieldErrors,
}

impl FormState {
    fn new(kind: FormKind, title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            title: title.into(),
            fields,
            focus: 0,
            errors: FieldErrors::default(),
        }
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map_or("", |field| field.value.as_str())
    }

    fn set_value(&mut self, key: &str, value: impl Into<String>) {
        if let Some(field) = self.fields.iter_mut().find(|field| field.key == key) {
            field.value = value.into();
        }
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn input(&mut self, ch: char) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return;
        };
        match field.kind {
            FieldKind::Text | FieldKind::Secret => field.value.push(ch),
            FieldKind::Digits if ch.is_ascii_digit() => field.value.push(ch),
            FieldKind::Digits | FieldKind::Choice => {}
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus)
            && field.kind != FieldKind::Choice
        {
            field.value.pop();
        }
    }

    /// Steps a choice field. Returns the key of the field that changed.
    pub fn cycle(&mut self, forward: bool) -> Option<&'static str> {
        let field = self.fields.get_mut(self.focus)?;
        if field.kind != FieldKind::Choice || field.choices.is_empty() {
            return None;
        }
        let len = field.choices.len();
        let current = field
            .choices
            .iter()
            .position(|choice| choice.value == field.value);
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(idx), true) => (idx + 1) % len,
            (Some(idx), false) => (idx + len - 1) % len,
        };
        field.value = field.choices[next].value.clone();
        Some(field.key)
    }

    /// Swaps the options of a choice field, keeping the value if it is
    /// still offered.
    pub fn set_choices(&mut self, key: &str, choices: Vec<Choice>) {
        if let Some(field) = self.fields.iter_mut().find(|field| field.key == key) {
            if !choices.iter().any(|choice| choice.value == field.value) {
                field.value = choices
                    .first()
                    .map(|choice| choice.value.clone())
                    .unwrap_or_default();
            }
            field.choices = choices;
        }
    }
}

fn mode_title(mode: &FormMode, create: &str, edit: &str) -> String {
    if mode.is_create() {
        create.to_string()
    } else {
        edit.to_string()
    }
}

fn split_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.trim().splitn(2, ' ');
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.next().unwrap_or_default().trim().to_string();
    (first, last)
}

fn password_fields(fields: &mut Vec<FormField>, mode: &FormMode) {
    if mode.is_create() {
        fields.push(FormField::secret("password", "Password"));
        fields.push(FormField::secret("rePassword", "Re-Password"));
    } else {
        fields.push(FormField::secret("password", "New Password (optional)"));
        fields.push(FormField::secret("rePassword", "Re-Password"));
    }
}

pub fn shop_owner(mode: FormMode, existing: Option<&ShopOwner>) -> FormState {
    let (first, last) = existing.map_or_else(Default::default, |owner| {
        match (&owner.first_name, &owner.last_name) {
            (Some(first), Some(last)) => (first.clone(), last.clone()),
            _ => split_name(&owner.display_name()),
        }
    });
    let mut fields = vec![
        FormField::text("firstName", "First Name", first),
        FormField::text("lastName", "Last Name", last),
        FormField::text(
            "username",
            "Username",
            existing.map(|owner| owner.username.clone()).unwrap_or_default(),
        ),
    ];
    password_fields(&mut fields, &mode);
    let title = mode_title(&mode, "Add Shop Owner", "Edit Shop Owner");
    FormState::new(FormKind::ShopOwner(mode), title, fields)
}

pub fn to_shop_owner(form: &FormState) -> ShopOwnerForm {
    ShopOwnerForm {
        first_name: form.value("firstName").to_string(),
        last_name: form.value("lastName").to_string(),
        username: form.value("username").to_string(),
        password: form.value("password").to_string(),
        re_password: form.value("rePassword").to_string(),
    }
}

pub fn shop(mode: FormMode, existing: Option<&Shop>, owners: &[OwnerOption]) -> FormState {
    let mut owner_choices = vec![Choice::new("", "Select shop owner")];
    owner_choices.extend(
        owners
            .iter()
            .map(|owner| Choice::new(owner.id.clone(), owner.label.clone())),
    );
    let margin_choices = MARGIN_OPTIONS
        .iter()
        .map(|margin| Choice::new(margin.to_string(), format!("{margin}%")))
        .collect();

    let owner_id = existing
        .and_then(|shop| shop.owner.as_ref())
        .map(|owner| owner.id.clone())
        .unwrap_or_default();
    let margin = existing.map_or_else(|| MARGIN_OPTIONS[0].to_string(), |shop| shop.margin.to_string());

    let fields = vec![
        FormField::choice("ownerId", "Shop Owner", owner_id, owner_choices),
        FormField::text(
            "shopName",
            "Shop Name",
            existing.map(|shop| shop.shop_name.clone()).unwrap_or_default(),
        ),
        FormField::text(
            "location",
            "Location",
            existing.map(|shop| shop.location.clone()).unwrap_or_default(),
        ),
        FormField::choice("margin", "Shop Margin (%)", margin, margin_choices),
    ];
    let title = mode_title(&mode, "Add Shop", "Edit Shop");
    FormState::new(FormKind::Shop(mode), title, fields)
}

pub fn to_shop(form: &FormState) -> ShopForm {
    ShopForm {
        owner_id: form.value("ownerId").to_string(),
        shop_name: form.value("shopName").to_string(),
        location: form.value("location").to_string(),
        margin: form.value("margin").to_string(),
    }
}

fn shop_choices(shops: &[Shop], blank: &str) -> Vec<Choice> {
    let mut choices = vec![Choice::new("", blank)];
    choices.extend(
        shops
            .iter()
            .map(|shop| Choice::new(shop.id.clone(), shop.shop_name.clone())),
    );
    choices
}

pub fn cashier(mode: FormMode, existing: Option<&Cashier>, shops: &[Shop]) -> FormState {
    let (first, last) = existing.map_or_else(Default::default, |cashier| split_name(&cashier.full_name));
    let mut fields = vec![
        FormField::choice(
            "shopId",
            "Shop",
            existing.map(|cashier| cashier.shop.id.clone()).unwrap_or_default(),
            shop_choices(shops, "Select shop"),
        ),
        FormField::text("firstName", "First Name", first),
        FormField::text("lastName", "Last Name", last),
        FormField::text(
            "username",
            "Username",
            existing.map(|cashier| cashier.username.clone()).unwrap_or_default(),
        ),
    ];
    password_fields(&mut fields, &mode);
    let title = mode_title(&mode, "Add Cashier", "Edit Cashier");
    FormState::new(FormKind::Cashier(mode), title, fields)
}

pub fn to_cashier(form: &FormState) -> CashierForm {
    CashierForm {
        shop_id: form.value("shopId").to_string(),
        first_name: form.value("firstName").to_string(),
        last_name: form.value("lastName").to_string(),
        username: form.value("username").to_string(),
        password: form.value("password").to_string(),
        re_password: form.value("rePassword").to_string(),
    }
}

pub fn user(blank: &UserForm) -> FormState {
    let roles = Role::ALL
        .iter()
        .map(|role| Choice::new(role.as_str(), role.as_str()))
        .collect();
    let fields = vec![
        FormField::text("fullName", "Full Name", blank.full_name.clone()),
        FormField::text("username", "Username", blank.username.clone()),
        FormField::secret("password", "Password"),
        FormField::choice("role", "Role", blank.role.clone(), roles),
    ];
    FormState::new(FormKind::User, "Add User", fields)
}

pub fn to_user(form: &FormState) -> UserForm {
    UserForm {
        full_name: form.value("fullName").to_string(),
        username: form.value("username").to_string(),
        password: form.value("password").to_string(),
        role: form.value("role").to_string(),
    }
}

pub fn reset_password(id: &str, full_name: &str) -> FormState {
    FormState::new(
        FormKind::ResetPassword {
            id: id.to_string(),
            full_name: full_name.to_string(),
        },
        format!("Reset Password: {full_name}"),
        vec![FormField::secret("newPassword", "New Password")],
    )
}

pub fn to_password_reset(form: &FormState) -> PasswordResetForm {
    PasswordResetForm {
        new_password: form.value("newPassword").to_string(),
    }
}

/// Cashier picker for the query forms, narrowed to `shop_id`.
pub fn cashier_choices(catalog: &ShopCatalog, shop_id: &str) -> Vec<Choice> {
    let shop = (!shop_id.is_empty()).then_some(shop_id);
    let mut choices = vec![Choice::new("", "All cashiers")];
    choices.extend(
        catalog
            .cashiers_of(shop)
            .map(|cashier| Choice::new(cashier.id.clone(), cashier.username.clone())),
    );
    choices
}

pub fn game_result_query(query: &GameResultQuery, catalog: &ShopCatalog) -> FormState {
    let shop_id = query.shop_id.clone().unwrap_or_default();
    let fields = vec![
        FormField::choice(
            "shopId",
            "Shop",
            shop_id.clone(),
            shop_choices(catalog.shops(), "Select shop"),
        ),
        FormField::choice(
            "cashierId",
            "Cashier",
            query.cashier_id.clone().unwrap_or_default(),
            cashier_choices(catalog, &shop_id),
        ),
        FormField::text("date", "Date", query.date.format(DATE_FORMAT).to_string()),
        FormField::digits("eventId", "Event ID", query.event_id()),
    ];
    FormState::new(FormKind::GameResultQuery, "Search Game Results", fields)
}

fn parse_date(form: &mut FormState, key: &'static str, label: &str) -> Option<NaiveDate> {
    let raw = form.value(key).trim().to_string();
    match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            form.errors
                .insert(key, format!("{label} must be a date (YYYY-MM-DD)"));
            None
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Writes the form into `query`. Leaves errors on the form when the date
/// does not parse.
pub fn apply_game_result_query(form: &mut FormState, query: &mut GameResultQuery) -> bool {
    form.errors = FieldErrors::default();
    let Some(date) = parse_date(form, "date", "Date") else {
        return false;
    };
    query.date = date;
    query.shop_id = non_empty(form.value("shopId"));
    query.cashier_id = non_empty(form.value("cashierId"));
    query.set_event_id(form.value("eventId"));
    true
}

pub fn slip_query(query: &SlipQuery, catalog: &ShopCatalog) -> FormState {
    let shop_id = query.shop_id.clone().unwrap_or_default();
    let fields = vec![
        FormField::choice(
            "shopId",
            "Shop",
            shop_id.clone(),
            shop_choices(catalog.shops(), "Select shop"),
        ),
        FormField::choice(
            "cashierId",
            "Cashier",
            query.cashier_id.clone().unwrap_or_default(),
            cashier_choices(catalog, &shop_id),
        ),
        FormField::text(
            "date",
            "Date (optional)",
            query
                .date
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        ),
        FormField::digits("ticketNumber", "Ticket Number", query.ticket_number()),
        FormField::digits("gameId", "Game ID", query.game_id()),
    ];
    FormState::new(FormKind::SlipQuery, "Search Slips", fields)
}

pub fn apply_slip_query(form: &mut FormState, query: &mut SlipQuery) -> bool {
    form.errors = FieldErrors::default();
    let date = if form.value("date").trim().is_empty() {
        None
    } else {
        match parse_date(form, "date", "Date") {
            Some(date) => Some(date),
            None => return false,
        }
    };
    query.date = date;
    query.shop_id = non_empty(form.value("shopId"));
    query.cashier_id = non_empty(form.value("cashierId"));
    query.set_ticket_number(form.value("ticketNumber"));
    query.set_game_id(form.value("gameId"));
    // The stored values are sanitized; show them as stored.
    let (ticket, game) = (query.ticket_number().to_string(), query.game_id().to_string());
    form.set_value("ticketNumber", ticket);
    form.set_value("gameId", game);
    true
}

const RANGE_CUSTOM: &str = "custom";

fn range_value(range: DateRange) -> String {
    match range {
        DateRange::Last7 => "7".to_string(),
        DateRange::Last30 => "30".to_string(),
        DateRange::Last90 => "90".to_string(),
        DateRange::Custom { .. } => RANGE_CUSTOM.to_string(),
    }
}

pub fn report_filters(view: &ReportsView) -> FormState {
    let mut shops = vec![Choice::new("", "All shops")];
    shops.extend(
        view.shops()
            .iter()
            .map(|shop| Choice::new(shop.id.clone(), shop.shop_name.clone())),
    );
    let mut ranges: Vec<Choice> = DateRange::PRESETS
        .iter()
        .map(|range| Choice::new(range_value(*range), range.label()))
        .collect();
    ranges.push(Choice::new(RANGE_CUSTOM, "Custom Range"));

    let (start, end) = match view.range() {
        DateRange::Custom { start, end } => (
            start.format(DATE_FORMAT).to_string(),
            end.format(DATE_FORMAT).to_string(),
        ),
        _ => (String::new(), String::new()),
    };

    let fields = vec![
        FormField::choice(
            "shopId",
            "Shop",
            view.shop_filter().unwrap_or_default(),
            shops,
        ),
        FormField::choice(
            "range",
            "Date Range",
            range_value(view.range()),
            ranges,
        ),
        FormField::text("startDate", "Start Date (custom)", start),
        FormField::text("endDate", "End Date (custom)", end),
    ];
    FormState::new(FormKind::ReportFilters, "Report Filters", fields)
}

pub fn apply_report_filters(form: &mut FormState, view: &mut ReportsView) -> bool {
    form.errors = FieldErrors::default();
    let range = match form.value("range") {
        "7" => DateRange::Last7,
        "90" => DateRange::Last90,
        RANGE_CUSTOM => match DateRange::custom(form.value("startDate"), form.value("endDate")) {
            Ok(range) => range,
            Err(errors) => {
                form.errors = errors;
                return false;
            }
        },
        _ => DateRange::Last30,
    };
    view.set_range(range);
    view.set_shop_filter(non_empty(form.value("shopId")));
    true
}
