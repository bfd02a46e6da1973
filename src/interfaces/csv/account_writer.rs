use crate::domain::account::AccountSummary;
use crate::error::Result;
use std::io::Write;

/// Writes the admin projection of account states as CSV.
///
/// Credential fields never appear in the output; the projection only
/// carries account number, holder name, contact details and balance.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(dest: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().from_writer(dest),
        }
    }

    pub fn write_accounts(&mut self, accounts: Vec<AccountSummary>) -> Result<()> {
        self.writer
            .write_record(["account_number", "name", "email", "phone", "balance"])?;
        for account in accounts {
            let balance = account.balance.to_string();
            self.writer.write_record([
                account.account_number.as_str(),
                account.name.as_str(),
                account.email.as_str(),
                account.phone.as_str(),
                balance.as_str(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
