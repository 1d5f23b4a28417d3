use api_types::{MoneyCents, account::Account};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Balance,
    Notes,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            Self::Name => Self::Balance,
            Self::Balance => Self::Notes,
            Self::Notes => Self::Name,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Name => Self::Notes,
            Self::Balance => Self::Name,
            Self::Notes => Self::Balance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Enter account name")]
    BlankName,
    #[error("Enter a valid balance")]
    InvalidBalance,
}

/// Edit buffer behind the create/edit modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDraft {
    pub name: String,
    /// Raw text as typed; only parsed on save.
    pub balance: String,
    pub notes: String,
    pub focus: FormField,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub name: String,
    pub balance: MoneyCents,
    pub notes: String,
}

impl FormDraft {
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            balance: "0".to_string(),
            notes: String::new(),
            focus: FormField::Name,
        }
    }

    pub fn from_account(account: &Account, note: Option<&str>) -> Self {
        Self {
            name: account.name.clone(),
            balance: account.balance.or_zero().to_decimal_string(),
            notes: note.unwrap_or_default().to_string(),
            focus: FormField::Name,
        }
    }

    pub fn validate(&self) -> Result<ValidDraft, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankName);
        }
        let balance = if self.balance.trim().is_empty() {
            MoneyCents::ZERO
        } else {
            self.balance
                .parse::<MoneyCents>()
                .map_err(|_| ValidationError::InvalidBalance)?
        };
        Ok(ValidDraft {
            name: name.to_string(),
            balance,
            notes: self.notes.clone(),
        })
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_field(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn push_char(&mut self, ch: char) {
        self.focused_mut().push(ch);
    }

    pub fn pop_char(&mut self) {
        self.focused_mut().pop();
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Name => &mut self.name,
            FormField::Balance => &mut self.balance,
            FormField::Notes => &mut self.notes,
        }
    }
}
