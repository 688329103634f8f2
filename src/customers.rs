use crate::api::events::LogLine;
use crate::api::models::Customer;
use crate::csv_import::{self, CsvError};
use crate::error::ValidationError;

pub const EMPTY_PLACEHOLDER: &str = "No customers loaded.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRow {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerTable {
    Placeholder(&'static str),
    Rows(Vec<CustomerRow>),
}

/// The in-memory roster a campaign is sent to.
#[derive(Debug, Default)]
pub struct CustomerList {
    customers: Vec<Customer>,
}

impl CustomerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn add_manual(
        &mut self,
        name: &str,
        phone: &str,
        country_code: &str,
    ) -> Result<LogLine, ValidationError> {
        let (name, phone) = (name.trim(), phone.trim());
        if name.is_empty() || phone.is_empty() {
            return Err(ValidationError::MissingNameOrPhone);
        }
        self.customers
            .push(Customer::manual(name, phone, country_code.trim()));
        Ok(LogLine::success(format!("✔ Manually added customer: {name}.")))
    }

    /// Replaces the whole list with the parsed rows. On a parse error the
    /// current list is kept.
    pub fn load_from_csv(&mut self, text: &str) -> Result<LogLine, CsvError> {
        let parsed = csv_import::parse_customers(text)?;
        self.customers = parsed;
        log::info!("loaded {} customers from CSV", self.customers.len());
        Ok(LogLine::success(format!(
            "✔ Loaded {} customers from CSV.",
            self.customers.len()
        )))
    }

    pub fn clear(&mut self) -> LogLine {
        self.customers.clear();
        LogLine::info("ℹ️ Customer list cleared.")
    }

    pub fn table(&self) -> CustomerTable {
        if self.customers.is_empty() {
            return CustomerTable::Placeholder(EMPTY_PLACEHOLDER);
        }
        CustomerTable::Rows(
            self.customers
                .iter()
                .map(|c| CustomerRow {
                    name: c
                        .name
                        .clone()
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| "N/A".to_string()),
                    phone: format!(
                        "{}{}",
                        c.country_code.as_deref().unwrap_or_default(),
                        c.phone.as_deref().unwrap_or_default()
                    ),
                })
                .collect(),
        )
    }
}

pub fn csv_failure_line() -> LogLine {
    LogLine::error("❌ Error: Could not parse the CSV file.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_add_requires_name_and_phone() {
        let mut list = CustomerList::new();
        assert_eq!(list.add_manual("  ", "555", "+1"), Err(ValidationError::MissingNameOrPhone));
        assert_eq!(list.add_manual("Alice", "", "+1"), Err(ValidationError::MissingNameOrPhone));
        assert!(list.is_empty());

        let line = list.add_manual(" Alice ", "555", " +1 ").unwrap();
        assert_eq!(line.message, "✔ Manually added customer: Alice.");
        assert_eq!(list.customers()[0], Customer::manual("Alice", "555", "+1"));
    }

    #[test]
    fn bad_csv_keeps_previous_list() {
        let mut list = CustomerList::new();
        list.add_manual("Alice", "555", "").unwrap();
        assert!(list.load_from_csv("name,phone").is_err());
        assert_eq!(list.len(), 1);
        assert_eq!(list.customers()[0].name.as_deref(), Some("Alice"));
    }

    #[test]
    fn csv_replaces_whole_list() {
        let mut list = CustomerList::new();
        list.add_manual("Zed", "1", "").unwrap();
        let line = list.load_from_csv("name,phone\nAlice,555\nBob,556").unwrap();
        assert_eq!(line.message, "✔ Loaded 2 customers from CSV.");
        assert_eq!(list.len(), 2);
        assert_eq!(list.customers()[0].name.as_deref(), Some("Alice"));
    }

    #[test]
    fn table_shows_placeholder_and_joined_phone() {
        let mut list = CustomerList::new();
        assert_eq!(list.table(), CustomerTable::Placeholder(EMPTY_PLACEHOLDER));

        list.load_from_csv("phone,country_code\n555,+44").unwrap();
        list.add_manual("Bob", "556", "+1").unwrap();
        assert_eq!(
            list.table(),
            CustomerTable::Rows(vec![
                CustomerRow { name: "N/A".into(), phone: "+44555".into() },
                CustomerRow { name: "Bob".into(), phone: "+1556".into() },
            ])
        );

        list.clear();
        assert!(list.is_empty());
    }
}
