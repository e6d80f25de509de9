//! Key handling for the signed-in console, one mode at a time.

use admin_core::{
    ErrorKind, ExportFormat, FormMode,
    views::{
        Outcome, cashiers::ShopFilter, dashboard::NOT_CONNECTED_MESSAGE, reports::ReportColumn,
        users::UsersView,
    },
};
use chrono::Utc;
use tracing::{debug, info};

use super::{
    App, ConfirmAction, ConfirmState, Detail, Mode, Section,
    forms::{self, FormKind},
};
use crate::ui::keymap::AppAction;

impl App {
    pub(super) async fn handle_console_key(&mut self, action: AppAction) {
        match self.state.mode {
            Mode::Normal => self.handle_normal_key(action).await,
            Mode::Search => self.handle_search_key(action),
            Mode::Form => self.handle_form_key(action).await,
            Mode::Confirm => self.handle_confirm_key(action).await,
            Mode::Detail => self.handle_detail_key(action),
        }
    }

    async fn handle_normal_key(&mut self, action: AppAction) {
        match action {
            AppAction::Cancel => self.state.close_toast(),
            AppAction::NextField => self.open_section(self.state.section.next()).await,
            AppAction::PrevField => self.open_section(self.state.section.prev()).await,
            AppAction::Up => self.state.select_prev(),
            AppAction::Down => self.state.select_next(),
            AppAction::Left => self.move_report_column(false),
            AppAction::Right => self.move_report_column(true),
            AppAction::Submit => self.open_detail(),
            AppAction::Input(ch) => self.handle_shortcut(ch).await,
            AppAction::Backspace | AppAction::Quit | AppAction::None => {}
        }
    }

    async fn handle_shortcut(&mut self, ch: char) {
        if let Some(section) = Section::from_digit(ch) {
            self.open_section(section).await;
            return;
        }

        let section = self.state.section;
        match ch {
            'q' => self.should_quit = true,
            'k' => self.state.select_prev(),
            'j' => self.state.select_next(),
            '/' if section.searchable() => self.state.mode = Mode::Search,
            'r' => self.reload_section().await,
            'n' => self.open_create_form().await,
            'e' => self.open_edit_form().await,
            'd' => self.confirm_delete(),
            's' => self.toggle_selected().await,
            'f' => self.open_filters().await,
            'a' if section == Section::GameResults => {
                self.state.game_results.toggle_auto_refresh();
            }
            'b' if section == Section::Cashiers => self.show_bat_content().await,
            'g' if section == Section::Cashiers => {
                if let Some(id) = self.state.selected_id() {
                    self.ask(
                        "Regenerate the display session for this cashier? The current display will disconnect.",
                        ConfirmAction::RegenerateSession(id),
                    );
                }
            }
            'p' if section == Section::Users => self.open_password_reset(),
            't' if section == Section::Reports => {
                let tab = self.state.reports.tab().toggled();
                self.state.reports.set_tab(tab);
                self.state.report_column = 0;
                let outcome = self
                    .state
                    .reports
                    .load(&self.gateway, &self.state.session)
                    .await;
                self.after_fetch(outcome).await;
            }
            'o' if section == Section::Reports => {
                let columns = ReportColumn::for_tab(self.state.reports.tab());
                if let Some(column) = columns.get(self.state.report_column) {
                    self.state.reports.sort_by(*column);
                }
            }
            'x' if section == Section::Reports => self.export_report(ExportFormat::Xlsx),
            'X' if section == Section::Reports => self.export_report(ExportFormat::Csv),
            'm' => {
                let collapsed = self.state.session.toggle_sidebar();
                debug!(collapsed, "sidebar toggled");
                self.persist_session();
            }
            'L' => self.ask("Log out of the admin console?", ConfirmAction::Logout),
            _ => {}
        }
    }

    fn handle_search_key(&mut self, action: AppAction) {
        match action {
            AppAction::Input(ch) => {
                let mut term = self.state.search_term().to_string();
                term.push(ch);
                self.state.set_search_term(term);
            }
            AppAction::Backspace => {
                let mut term = self.state.search_term().to_string();
                term.pop();
                self.state.set_search_term(term);
            }
            AppAction::Cancel => {
                self.state.set_search_term(String::new());
                self.state.mode = Mode::Normal;
            }
            AppAction::Submit => self.state.mode = Mode::Normal,
            AppAction::Up => self.state.select_prev(),
            AppAction::Down => self.state.select_next(),
            _ => {}
        }
    }

    async fn handle_form_key(&mut self, action: AppAction) {
        if action == AppAction::Submit {
            self.submit_form().await;
            return;
        }
        if action == AppAction::Cancel {
            self.close_form();
            return;
        }

        let Some(form) = self.state.form.as_mut() else {
            self.state.mode = Mode::Normal;
            return;
        };
        match action {
            AppAction::NextField | AppAction::Down => form.next_field(),
            AppAction::PrevField | AppAction::Up => form.prev_field(),
            AppAction::Left | AppAction::Right => {
                let changed = form.cycle(action == AppAction::Right);
                if changed == Some("shopId") {
                    let shop_id = form.value("shopId").to_string();
                    let catalog = match form.kind {
                        FormKind::GameResultQuery => Some(self.state.game_results.catalog()),
                        FormKind::SlipQuery => Some(self.state.slips.catalog()),
                        _ => None,
                    };
                    if let Some(catalog) = catalog {
                        form.set_choices("cashierId", forms::cashier_choices(catalog, &shop_id));
                    }
                }
            }
            AppAction::Input(ch) => form.input(ch),
            AppAction::Backspace => form.backspace(),
            _ => {}
        }
    }

    async fn handle_confirm_key(&mut self, action: AppAction) {
        match action {
            AppAction::Submit | AppAction::Input('y') | AppAction::Input('Y') => {
                self.state.mode = Mode::Normal;
                if let Some(confirm) = self.state.confirm.take() {
                    self.run_confirmed(confirm.action).await;
                }
            }
            AppAction::Cancel | AppAction::Input('n') | AppAction::Input('N') => {
                self.state.confirm = None;
                self.state.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, action: AppAction) {
        if matches!(
            action,
            AppAction::Cancel | AppAction::Submit | AppAction::Input('q')
        ) {
            if matches!(self.state.detail, Some(Detail::Slip)) {
                self.state.slips.deselect();
            }
            self.state.detail = None;
            self.state.mode = Mode::Normal;
        }
    }

    pub(super) async fn open_section(&mut self, section: Section) {
        self.state.section = section;
        self.state.mode = Mode::Normal;
        if !self.state.loaded[section.index()] {
            self.load_section().await;
        }
    }

    async fn reload_section(&mut self) {
        if self.state.section != Section::Dashboard {
            self.load_section().await;
            return;
        }
        match &self.live {
            Some(live) => {
                self.state.dashboard.refresh(live, Utc::now());
            }
            None => self.state.dashboard.toasts().error(NOT_CONNECTED_MESSAGE),
        }
    }

    /// Fetches whatever the active section shows.
    async fn load_section(&mut self) {
        let section = self.state.section;
        self.state.loaded[section.index()] = true;
        let gateway = &self.gateway;
        let session = &self.state.session;

        let outcome = match section {
            Section::Dashboard => None,
            Section::ShopOwners => Some(self.state.shop_owners.load(gateway, session).await),
            Section::Shops => Some(self.state.shops.load(gateway, session).await),
            Section::Cashiers => Some(self.state.cashiers.load(gateway, session).await),
            Section::GameResults => {
                self.state.game_results.load_catalog(gateway, session).await;
                None
            }
            Section::Slips => {
                self.state.slips.load_catalog(gateway, session).await;
                None
            }
            Section::Reports => {
                self.state.reports.load_filters(gateway, session).await;
                Some(self.state.reports.load(gateway, session).await)
            }
            Section::Users => Some(self.state.users.load(gateway, session).await),
        };
        if let Some(outcome) = outcome {
            self.after_fetch(outcome).await;
        }
    }

    async fn open_create_form(&mut self) {
        let form = match self.state.section {
            Section::ShopOwners => forms::shop_owner(FormMode::Create, None),
            Section::Shops => {
                self.state
                    .shops
                    .load_owners(&self.gateway, &self.state.session)
                    .await;
                forms::shop(FormMode::Create, None, &self.state.shops.owner_options())
            }
            Section::Cashiers => forms::cashier(FormMode::Create, None, self.state.cashiers.shops()),
            Section::Users => forms::user(&UsersView::blank_form()),
            _ => return,
        };
        self.open_form(form);
    }

    async fn open_edit_form(&mut self) {
        let Some(id) = self.state.selected_id() else {
            return;
        };
        let mode = FormMode::Edit(id.clone());
        let form = match self.state.section {
            Section::ShopOwners => {
                forms::shop_owner(mode, self.state.shop_owners.list().find(&id))
            }
            Section::Shops => {
                self.state
                    .shops
                    .load_owners(&self.gateway, &self.state.session)
                    .await;
                forms::shop(
                    mode,
                    self.state.shops.list().find(&id),
                    &self.state.shops.owner_options(),
                )
            }
            Section::Cashiers => forms::cashier(
                mode,
                self.state.cashiers.list().find(&id),
                self.state.cashiers.shops(),
            ),
            _ => return,
        };
        self.open_form(form);
    }

    fn open_password_reset(&mut self) {
        let Some(id) = self.state.selected_id() else {
            return;
        };
        let full_name = self
            .state
            .users
            .list()
            .find(&id)
            .map(|user| user.full_name.clone())
            .unwrap_or_default();
        self.open_form(forms::reset_password(&id, &full_name));
    }

    async fn open_filters(&mut self) {
        let form = match self.state.section {
            Section::Cashiers => {
                self.cycle_cashier_filter();
                return;
            }
            Section::GameResults => forms::game_result_query(
                &self.state.game_results.query,
                self.state.game_results.catalog(),
            ),
            Section::Slips => {
                forms::slip_query(&self.state.slips.query, self.state.slips.catalog())
            }
            Section::Reports => forms::report_filters(&self.state.reports),
            _ => return,
        };
        self.open_form(form);
    }

    fn cycle_cashier_filter(&mut self) {
        let shops = self.state.cashiers.shops();
        let next = match self.state.cashiers.shop_filter() {
            ShopFilter::All => shops.first(),
            ShopFilter::Shop(current) => shops
                .iter()
                .position(|shop| shop.id == *current)
                .and_then(|idx| shops.get(idx + 1)),
        }
        .map_or(ShopFilter::All, |shop| ShopFilter::Shop(shop.id.clone()));
        self.state.cashiers.set_shop_filter(next);
        self.state.selected[Section::Cashiers.index()] = 0;
    }

    fn open_form(&mut self, form: forms::FormState) {
        self.state.form = Some(form);
        self.state.mode = Mode::Form;
    }

    fn close_form(&mut self) {
        self.state.form = None;
        self.state.mode = Mode::Normal;
    }

    /// Field errors keep the form open; so do failed requests, so the
    /// operator can correct and resend.
    async fn submit_form(&mut self) {
        let Some(mut form) = self.state.form.take() else {
            self.state.mode = Mode::Normal;
            return;
        };
        let gateway = &self.gateway;
        let session = &self.state.session;

        let outcome = match form.kind.clone() {
            FormKind::ShopOwner(mode) => {
                self.state
                    .shop_owners
                    .save(gateway, session, &mode, &forms::to_shop_owner(&form))
                    .await
            }
            FormKind::Shop(mode) => {
                self.state
                    .shops
                    .save(gateway, session, &mode, &forms::to_shop(&form))
                    .await
            }
            FormKind::Cashier(mode) => {
                self.state
                    .cashiers
                    .save(gateway, session, &mode, &forms::to_cashier(&form))
                    .await
            }
            FormKind::User => {
                self.state
                    .users
                    .create(gateway, session, &forms::to_user(&form))
                    .await
            }
            FormKind::ResetPassword { id, .. } => {
                self.state
                    .users
                    .reset_password(gateway, session, &id, &forms::to_password_reset(&form))
                    .await
            }
            FormKind::GameResultQuery => {
                if !forms::apply_game_result_query(&mut form, &mut self.state.game_results.query) {
                    self.state.form = Some(form);
                    return;
                }
                self.state.mode = Mode::Normal;
                let outcome = self.state.game_results.search(gateway, session).await;
                if let Some(outcome) = outcome {
                    self.after_fetch(outcome).await;
                }
                return;
            }
            FormKind::SlipQuery => {
                if !forms::apply_slip_query(&mut form, &mut self.state.slips.query) {
                    self.state.form = Some(form);
                    return;
                }
                self.state.mode = Mode::Normal;
                let outcome = self.state.slips.search(gateway, session).await;
                if let Some(outcome) = outcome {
                    self.after_fetch(outcome).await;
                }
                return;
            }
            FormKind::ReportFilters => {
                if !forms::apply_report_filters(&mut form, &mut self.state.reports) {
                    self.state.form = Some(form);
                    return;
                }
                self.state.mode = Mode::Normal;
                let outcome = self.state.reports.load(gateway, session).await;
                self.after_fetch(outcome).await;
                return;
            }
        };

        match outcome {
            Outcome::Applied => {
                self.close_form();
                self.state.clamp_selection();
            }
            Outcome::Rejected(errors) => {
                form.errors = errors;
                self.state.form = Some(form);
            }
            Outcome::Failed(ErrorKind::Unauthorized) => self.session_expired().await,
            Outcome::Failed(_) => self.state.form = Some(form),
            Outcome::Skipped => self.close_form(),
        }
    }

    fn confirm_delete(&mut self) {
        let Some(id) = self.state.selected_id() else {
            return;
        };
        let (message, action) = match self.state.section {
            Section::ShopOwners => (
                "Delete this shop owner?",
                ConfirmAction::DeleteShopOwner(id),
            ),
            Section::Shops => ("Delete this shop?", ConfirmAction::DeleteShop(id)),
            Section::Cashiers => ("Delete this cashier?", ConfirmAction::DeleteCashier(id)),
            Section::Users => ("Delete this user?", ConfirmAction::DeleteUser(id)),
            _ => return,
        };
        self.ask(message, action);
    }

    fn ask(&mut self, message: &str, action: ConfirmAction) {
        self.state.confirm = Some(ConfirmState {
            message: message.to_string(),
            action,
        });
        self.state.mode = Mode::Confirm;
    }

    async fn run_confirmed(&mut self, action: ConfirmAction) {
        let gateway = &self.gateway;
        let session = &self.state.session;
        let outcome = match &action {
            ConfirmAction::DeleteShopOwner(id) => {
                self.state.shop_owners.delete(gateway, session, id).await
            }
            ConfirmAction::DeleteShop(id) => self.state.shops.delete(gateway, session, id).await,
            ConfirmAction::DeleteCashier(id) => {
                self.state.cashiers.delete(gateway, session, id).await
            }
            ConfirmAction::DeleteUser(id) => self.state.users.delete(gateway, session, id).await,
            ConfirmAction::RegenerateSession(id) => {
                self.state
                    .cashiers
                    .regenerate_session(gateway, session, id)
                    .await
            }
            ConfirmAction::Logout => {
                self.logout().await;
                return;
            }
        };
        debug!(?action, applied = outcome.is_applied(), "confirmed action");
        self.after_outcome(&outcome).await;
    }

    async fn toggle_selected(&mut self) {
        let Some(id) = self.state.selected_id() else {
            return;
        };
        let gateway = &self.gateway;
        let session = &self.state.session;
        let outcome = match self.state.section {
            Section::ShopOwners => {
                self.state
                    .shop_owners
                    .toggle_status(gateway, session, &id)
                    .await
            }
            Section::Shops => self.state.shops.toggle_status(gateway, session, &id).await,
            Section::Cashiers => {
                self.state
                    .cashiers
                    .toggle_status(gateway, session, &id)
                    .await
            }
            Section::Users => self.state.users.toggle_status(gateway, session, &id).await,
            _ => return,
        };
        self.after_outcome(&outcome).await;
    }

    async fn show_bat_content(&mut self) {
        let Some(id) = self.state.selected_id() else {
            return;
        };
        let username = self
            .state
            .cashiers
            .list()
            .find(&id)
            .map(|cashier| cashier.username.clone())
            .unwrap_or_default();
        if let Some(body) = self
            .state
            .cashiers
            .bat_content(&self.gateway, &self.state.session, &id)
            .await
        {
            self.state.detail = Some(Detail::Text {
                title: format!("BAT Commands: {username}"),
                body,
            });
            self.state.mode = Mode::Detail;
        }
    }

    fn open_detail(&mut self) {
        if self.state.section != Section::Slips {
            return;
        }
        if let Some(id) = self.state.selected_id()
            && self.state.slips.select(&id)
        {
            self.state.detail = Some(Detail::Slip);
            self.state.mode = Mode::Detail;
        }
    }

    fn move_report_column(&mut self, forward: bool) {
        if self.state.section != Section::Reports {
            return;
        }
        let len = ReportColumn::for_tab(self.state.reports.tab()).len();
        let column = &mut self.state.report_column;
        *column = if forward {
            (*column + 1).min(len.saturating_sub(1))
        } else {
            column.saturating_sub(1)
        };
    }

    fn export_report(&mut self, format: ExportFormat) {
        let dir = self.config.export_dir();
        if let Some(path) = self.state.reports.export(&dir, format) {
            info!(path = %path.display(), "report exported");
        }
    }
}
