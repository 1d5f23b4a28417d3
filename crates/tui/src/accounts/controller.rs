use api_types::{
    MoneyCents,
    account::{Account, AccountId, AccountPayload},
};

use crate::{
    accounts::{
        form::{FormDraft, ValidationError},
        notes::NotesStore,
        optimistic::Optimistic,
    },
    client::{AccountsApi, ApiError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    /// Banner text; the list is empty in this state.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(Account),
}

impl EditorMode {
    fn editing_id(&self) -> Option<AccountId> {
        match self {
            Self::Create => None,
            Self::Edit(account) => Some(account.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Closed,
    Editor { mode: EditorMode, draft: FormDraft },
    ConfirmDelete(Account),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("no account selected")]
    NoTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub count: usize,
    pub total: MoneyCents,
}

/// An account already removed from the list, waiting for the server to
/// confirm the deletion.
#[derive(Debug)]
#[must_use = "pass the ticket to complete_delete"]
pub struct DeleteTicket {
    target: Account,
    change: Optimistic<Account>,
}

impl DeleteTicket {
    pub fn target(&self) -> &Account {
        &self.target
    }
}

/// State and actions of the accounts screen.
///
/// The list mirrors the server collection. Loads replace it wholesale,
/// saves patch it with the record the server returned, and deletes are
/// applied optimistically and rolled back on failure.
#[derive(Debug)]
pub struct AccountsPage<A> {
    api: A,
    token: Option<String>,
    accounts: Vec<Account>,
    notes: NotesStore,
    load_state: LoadState,
    modal: Modal,
    saving: bool,
    alert: Option<String>,
    selected: usize,
}

impl<A: AccountsApi> AccountsPage<A> {
    pub fn new(api: A, token: Option<String>) -> Self {
        Self {
            api,
            token,
            accounts: Vec::new(),
            notes: NotesStore::default(),
            load_state: LoadState::Idle,
            modal: Modal::Closed,
            saving: false,
            alert: None,
            selected: 0,
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn notes(&self) -> &NotesStore {
        &self.notes
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn error_banner(&self) -> Option<&str> {
        match &self.load_state {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn draft_mut(&mut self) -> Option<&mut FormDraft> {
        match &mut self.modal {
            Modal::Editor { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Drops everything tied to the current session.
    pub fn reset(&mut self) {
        self.accounts.clear();
        self.notes = NotesStore::default();
        self.load_state = LoadState::Idle;
        self.modal = Modal::Closed;
        self.alert = None;
        self.selected = 0;
    }

    pub fn summary(&self) -> Summary {
        Summary {
            count: self.accounts.len(),
            total: self.accounts.iter().map(|a| a.balance.or_zero()).sum(),
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_account(&self) -> Option<&Account> {
        self.accounts.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.accounts.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.accounts.len() - 1);
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Selects the row at `index` if it exists.
    pub fn select(&mut self, index: usize) {
        if index < self.accounts.len() {
            self.selected = index;
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.accounts.len().saturating_sub(1));
    }

    /// Fetches the collection and replaces the local list with it.
    pub async fn load(&mut self) -> Result<usize, ApiError> {
        self.load_state = LoadState::Loading;
        let result = self.api.list_accounts(self.token.as_deref()).await;
        match result {
            Ok(accounts) => {
                tracing::info!(count = accounts.len(), "accounts loaded");
                self.accounts = accounts;
                self.load_state = LoadState::Loaded;
                self.clamp_selection();
                Ok(self.accounts.len())
            }
            Err(err) => {
                tracing::warn!("failed to load accounts: {err}");
                self.load_state =
                    LoadState::Error(format!("Failed to load accounts: {}", err.status_label()));
                self.accounts.clear();
                self.selected = 0;
                Err(err)
            }
        }
    }

    pub fn open_create(&mut self) {
        self.modal = Modal::Editor {
            mode: EditorMode::Create,
            draft: FormDraft::empty(),
        };
    }

    pub fn open_edit(&mut self, account: &Account) {
        let draft = FormDraft::from_account(account, self.notes.get(account.id));
        self.modal = Modal::Editor {
            mode: EditorMode::Edit(account.clone()),
            draft,
        };
    }

    pub fn open_edit_selected(&mut self) {
        if let Some(account) = self.selected_account().cloned() {
            self.open_edit(&account);
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::Closed;
    }

    /// Submits the editor. Validation failures never reach the network;
    /// request failures leave the list untouched and the editor open.
    pub async fn save(&mut self) -> Result<Account, ActionError> {
        let Modal::Editor { mode, draft } = &self.modal else {
            return Err(ActionError::NoTarget);
        };
        let editing = mode.editing_id();
        let valid = match draft.validate() {
            Ok(valid) => valid,
            Err(err) => {
                self.alert = Some(err.to_string());
                return Err(err.into());
            }
        };
        let payload = AccountPayload {
            name: valid.name,
            balance: valid.balance,
        };

        self.saving = true;
        let result = match editing {
            Some(id) => {
                self.api
                    .update_account(self.token.as_deref(), id, &payload)
                    .await
            }
            None => self.api.create_account(self.token.as_deref(), &payload).await,
        };
        self.saving = false;

        let saved = match result {
            Ok(saved) => saved,
            Err(err) => {
                tracing::warn!("failed to save account: {err}");
                self.alert = Some(format!("Failed to save account: {}", err.status_label()));
                return Err(err.into());
            }
        };

        let listed = if editing.is_some() {
            match self.accounts.iter_mut().find(|a| a.id == saved.id) {
                Some(slot) => {
                    *slot = saved.clone();
                    true
                }
                None => false,
            }
        } else {
            self.accounts.retain(|a| a.id != saved.id);
            self.accounts.insert(0, saved.clone());
            self.selected = 0;
            true
        };
        // no note for an account that is not on screen
        if listed {
            self.notes.set(saved.id, &valid.notes);
        }
        self.modal = Modal::Closed;
        tracing::info!(id = %saved.id, "account saved");
        Ok(saved)
    }

    pub fn confirm_delete(&mut self, account: &Account) {
        self.modal = Modal::ConfirmDelete(account.clone());
    }

    pub fn confirm_delete_selected(&mut self) {
        if let Some(account) = self.selected_account().cloned() {
            self.confirm_delete(&account);
        }
    }

    /// First half of a delete: drops the pending target from the list and
    /// closes the dialog. Nothing has been sent yet.
    pub fn begin_delete(&mut self) -> Option<DeleteTicket> {
        let Modal::ConfirmDelete(target) = &self.modal else {
            return None;
        };
        let target = target.clone();
        self.modal = Modal::Closed;

        let id = target.id;
        let change = Optimistic::apply(&mut self.accounts, |list| list.retain(|a| a.id != id));
        self.clamp_selection();
        Some(DeleteTicket { target, change })
    }

    /// Second half of a delete: asks the server and either keeps the removal
    /// (purging the note) or restores the previous list.
    pub async fn complete_delete(&mut self, ticket: DeleteTicket) -> Result<(), ActionError> {
        let DeleteTicket { target, change } = ticket;
        match self.api.delete_account(self.token.as_deref(), target.id).await {
            Ok(()) => {
                change.commit();
                self.notes.remove(target.id);
                tracing::info!(id = %target.id, "account deleted");
                Ok(())
            }
            Err(err) => {
                tracing::warn!("failed to delete account {}: {err}", target.id);
                change.rollback(&mut self.accounts);
                self.clamp_selection();
                self.alert = Some(format!("Failed to delete account: {}", err.status_label()));
                Err(err.into())
            }
        }
    }

    pub async fn delete(&mut self) -> Result<(), ActionError> {
        let ticket = self.begin_delete().ok_or(ActionError::NoTarget)?;
        self.complete_delete(ticket).await
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use api_types::Balance;
    use reqwest::StatusCode;

    use super::*;

    #[derive(Default)]
    struct FakeApi {
        server: RefCell<Vec<Account>>,
        fail: RefCell<Option<ApiError>>,
        calls: RefCell<Vec<String>>,
        next_id: Cell<i64>,
    }

    impl FakeApi {
        fn with(accounts: Vec<Account>) -> Self {
            let next = accounts.iter().map(|a| a.id.0).max().unwrap_or(0) + 1;
            let api = Self::default();
            *api.server.borrow_mut() = accounts;
            api.next_id.set(next);
            api
        }

        fn fail_with(&self, err: ApiError) {
            *self.fail.borrow_mut() = Some(err);
        }

        fn heal(&self) {
            *self.fail.borrow_mut() = None;
        }

        fn check(&self, call: String) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(call);
            match self.fail.borrow().as_ref() {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl AccountsApi for FakeApi {
        async fn list_accounts(&self, token: Option<&str>) -> Result<Vec<Account>, ApiError> {
            self.check(format!("list {token:?}"))?;
            Ok(self.server.borrow().clone())
        }

        async fn create_account(
            &self,
            token: Option<&str>,
            payload: &AccountPayload,
        ) -> Result<Account, ApiError> {
            self.check(format!("create {token:?} {}", payload.name))?;
            let id = AccountId(self.next_id.get());
            self.next_id.set(id.0 + 1);
            let account = Account {
                id,
                name: payload.name.clone(),
                balance: payload.balance.into(),
                created_at: None,
            };
            self.server.borrow_mut().push(account.clone());
            Ok(account)
        }

        async fn update_account(
            &self,
            token: Option<&str>,
            id: AccountId,
            payload: &AccountPayload,
        ) -> Result<Account, ApiError> {
            self.check(format!("update {token:?} {id}"))?;
            let mut server = self.server.borrow_mut();
            let slot = server
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| http(404))?;
            slot.name = payload.name.clone();
            slot.balance = payload.balance.into();
            Ok(slot.clone())
        }

        async fn delete_account(&self, token: Option<&str>, id: AccountId) -> Result<(), ApiError> {
            self.check(format!("delete {token:?} {id}"))?;
            self.server.borrow_mut().retain(|a| a.id != id);
            Ok(())
        }
    }

    fn http(code: u16) -> ApiError {
        ApiError::Http {
            status: StatusCode::from_u16(code).unwrap(),
            message: "boom".to_string(),
        }
    }

    fn account(id: i64, name: &str, cents: i64) -> Account {
        Account {
            id: AccountId(id),
            name: name.to_string(),
            balance: MoneyCents::new(cents).into(),
            created_at: Some("2024-01-01".to_string()),
        }
    }

    fn page(accounts: Vec<Account>) -> AccountsPage<FakeApi> {
        AccountsPage::new(FakeApi::with(accounts), Some("tok".to_string()))
    }

    fn ids(page: &AccountsPage<FakeApi>) -> Vec<i64> {
        page.accounts().iter().map(|a| a.id.0).collect()
    }

    #[tokio::test]
    async fn load_replaces_list_and_summarizes() {
        let mut page = page(vec![account(1, "Checking", 10050)]);
        assert_eq!(page.load().await.unwrap(), 1);

        let summary = page.summary();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.total.to_string(), "$100.50");
        assert_eq!(page.load_state(), &LoadState::Loaded);
        assert_eq!(page.api.calls(), ["list Some(\"tok\")"]);
    }

    #[tokio::test]
    async fn failed_load_clears_list_and_sets_banner() {
        let mut page = page(vec![account(1, "Checking", 100)]);
        page.load().await.unwrap();

        page.api.fail_with(http(401));
        assert!(page.load().await.is_err());
        assert!(page.accounts().is_empty());
        assert_eq!(page.error_banner(), Some("Failed to load accounts: 401"));

        page.api.fail_with(ApiError::Network("refused".to_string()));
        page.load().await.unwrap_err();
        assert_eq!(
            page.error_banner(),
            Some("Failed to load accounts: Network error")
        );

        page.api.heal();
        page.load().await.unwrap();
        assert_eq!(page.error_banner(), None);
    }

    #[test]
    fn total_counts_missing_balances_as_zero() {
        let mut page = page(vec![]);
        page.accounts = vec![
            account(1, "A", 150),
            Account {
                balance: Balance::missing(),
                ..account(2, "B", 0)
            },
            account(3, "C", -50),
        ];
        assert_eq!(page.summary().total, MoneyCents::new(100));
        assert_eq!(page.summary().count, 3);
    }

    #[tokio::test]
    async fn blank_name_never_reaches_the_network() {
        let mut page = page(vec![account(1, "Checking", 100)]);
        page.load().await.unwrap();
        let before = page.accounts().to_vec();

        page.open_create();
        page.draft_mut().unwrap().name = "   ".to_string();
        let err = page.save().await.unwrap_err();

        assert_eq!(err, ActionError::Validation(ValidationError::BlankName));
        assert_eq!(page.alert(), Some("Enter account name"));
        assert_eq!(page.accounts(), before.as_slice());
        assert_eq!(page.api.calls().len(), 1);
        assert!(matches!(page.modal(), Modal::Editor { .. }));
    }

    #[tokio::test]
    async fn invalid_balance_blocks_save() {
        let mut page = page(vec![]);
        page.open_create();
        let draft = page.draft_mut().unwrap();
        draft.name = "Savings".to_string();
        draft.balance = "lots".to_string();

        let err = page.save().await.unwrap_err();
        assert_eq!(err, ActionError::Validation(ValidationError::InvalidBalance));
        assert!(page.api.calls().is_empty());
    }

    #[tokio::test]
    async fn create_prepends_returned_record_and_stores_note() {
        let mut page = page(vec![account(1, "Checking", 10050)]);
        page.load().await.unwrap();

        page.open_create();
        let draft = page.draft_mut().unwrap();
        draft.name = "Savings".to_string();
        draft.balance = "250".to_string();
        draft.notes = "emergency fund".to_string();

        let saved = page.save().await.unwrap();
        assert_eq!(saved.id, AccountId(2));
        assert_eq!(saved.balance.cents(), Some(MoneyCents::new(25000)));
        assert_eq!(ids(&page), [2, 1]);
        assert_eq!(page.notes().get(AccountId(2)), Some("emergency fund"));
        assert_eq!(page.modal(), &Modal::Closed);
        assert!(!page.is_saving());
    }

    #[tokio::test]
    async fn edit_replaces_entry_with_server_record() {
        let mut page = page(vec![account(1, "Checking", 100), account(2, "Cash", 200)]);
        page.load().await.unwrap();

        let target = page.accounts()[1].clone();
        page.open_edit(&target);
        let draft = page.draft_mut().unwrap();
        draft.name = "Wallet".to_string();
        draft.balance = "12.5".to_string();

        page.save().await.unwrap();
        let matching: Vec<&Account> = page
            .accounts()
            .iter()
            .filter(|a| a.id == AccountId(2))
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0], &page.api.server.borrow()[1]);
        assert_eq!(matching[0].name, "Wallet");
        assert_eq!(ids(&page), [1, 2]);
    }

    #[tokio::test]
    async fn edit_seeds_existing_note() {
        let mut page = page(vec![account(1, "Checking", 100)]);
        page.load().await.unwrap();
        page.notes.set(AccountId(1), "salary");

        page.open_edit(&page.accounts()[0].clone());
        let Modal::Editor { draft, mode } = page.modal() else {
            panic!("editor not open");
        };
        assert_eq!(draft.notes, "salary");
        assert!(matches!(mode, EditorMode::Edit(a) if a.id == AccountId(1)));
    }

    #[tokio::test]
    async fn edit_of_account_no_longer_listed_leaves_no_note() {
        let mut page = page(vec![account(1, "Checking", 100), account(2, "Cash", 200)]);
        page.load().await.unwrap();

        page.open_edit(&page.accounts()[1].clone());
        page.draft_mut().unwrap().notes = "pocket money".to_string();
        // a reload dropped the row while the editor was open
        page.accounts.retain(|a| a.id != AccountId(2));

        let saved = page.save().await.unwrap();
        assert_eq!(saved.id, AccountId(2));
        assert_eq!(ids(&page), [1]);
        assert_eq!(page.notes().get(AccountId(2)), None);
        assert_eq!(page.modal(), &Modal::Closed);
    }

    #[tokio::test]
    async fn failed_save_keeps_state_and_editor_open() {
        let mut page = page(vec![account(1, "Checking", 100)]);
        page.load().await.unwrap();
        let before = page.accounts().to_vec();

        page.api.fail_with(http(500));
        page.open_create();
        page.draft_mut().unwrap().name = "Savings".to_string();
        let err = page.save().await.unwrap_err();

        assert_eq!(err, ActionError::Api(http(500)));
        assert_eq!(page.accounts(), before.as_slice());
        assert_eq!(page.alert(), Some("Failed to save account: 500"));
        assert!(matches!(page.modal(), Modal::Editor { .. }));
        assert!(!page.is_saving());
        assert_eq!(page.notes().get(AccountId(2)), None);
    }

    #[tokio::test]
    async fn delete_is_optimistic_and_rolls_back_exactly() {
        let mut page = page(vec![
            account(3, "C", 300),
            account(1, "A", 100),
            account(2, "B", 200),
        ]);
        page.load().await.unwrap();
        page.notes.set(AccountId(1), "keep me");

        page.confirm_delete(&page.accounts()[1].clone());
        let ticket = page.begin_delete().unwrap();
        assert_eq!(ids(&page), [3, 2]);
        assert_eq!(page.modal(), &Modal::Closed);

        page.api.fail_with(http(403));
        let err = page.complete_delete(ticket).await.unwrap_err();
        assert_eq!(err, ActionError::Api(http(403)));
        assert_eq!(ids(&page), [3, 1, 2]);
        assert_eq!(page.alert(), Some("Failed to delete account: 403"));
        assert_eq!(page.notes().get(AccountId(1)), Some("keep me"));
    }

    #[tokio::test]
    async fn successful_delete_purges_note_and_stays_deleted() {
        let mut page = page(vec![account(1, "Checking", 100), account(2, "Cash", 5)]);
        page.load().await.unwrap();
        page.notes.set(AccountId(1), "old bank");

        page.confirm_delete(&page.accounts()[0].clone());
        page.delete().await.unwrap();
        assert_eq!(ids(&page), [2]);
        assert_eq!(page.notes().get(AccountId(1)), None);

        page.load().await.unwrap();
        assert_eq!(ids(&page), [2]);
        assert_eq!(
            page.api.calls(),
            [
                "list Some(\"tok\")",
                "delete Some(\"tok\") 1",
                "list Some(\"tok\")",
            ]
        );
    }

    #[tokio::test]
    async fn delete_without_confirmation_is_a_no_op() {
        let mut page = page(vec![account(1, "Checking", 100)]);
        page.load().await.unwrap();
        assert_eq!(page.delete().await, Err(ActionError::NoTarget));
        assert_eq!(ids(&page), [1]);
    }

    #[tokio::test]
    async fn selection_follows_list_changes() {
        let mut page = page(vec![account(1, "A", 1), account(2, "B", 2)]);
        page.load().await.unwrap();
        page.select_next();
        page.select_next();
        assert_eq!(page.selected(), 1);

        page.confirm_delete_selected();
        page.delete().await.unwrap();
        assert_eq!(page.selected(), 0);
        assert_eq!(page.selected_account().map(|a| a.id), Some(AccountId(1)));
    }
}
