//! Initial database migration.
//!
//! Creates all enums and core tables: chart of accounts, journal storage,
//! members, savings, loans, and the internal marketplace.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: LEDGER STORAGE
        // ============================================================
        db.execute_unprepared(CHART_OF_ACCOUNTS_SQL).await?;
        db.execute_unprepared(JOURNAL_HEADERS_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 3: MEMBERS & SAVINGS
        // ============================================================
        db.execute_unprepared(MEMBERS_SQL).await?;
        db.execute_unprepared(SAVING_TYPES_SQL).await?;
        db.execute_unprepared(SAVINGS_SQL).await?;

        // ============================================================
        // PART 4: LOANS
        // ============================================================
        db.execute_unprepared(LOAN_TYPES_SQL).await?;
        db.execute_unprepared(LOANS_SQL).await?;
        db.execute_unprepared(LOAN_INSTALLMENTS_SQL).await?;

        // ============================================================
        // PART 5: MARKETPLACE
        // ============================================================
        db.execute_unprepared(PRODUCTS_SQL).await?;
        db.execute_unprepared(SALES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account types
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

-- Savings lifecycle
CREATE TYPE saving_status AS ENUM ('pending', 'approved', 'rejected');

-- Posting direction of a saving type
CREATE TYPE saving_type_kind AS ENUM ('deposit', 'withdrawal');

-- Loan lifecycle
CREATE TYPE loan_status AS ENUM (
    'pending',
    'accounting_approved',
    'approved',
    'paid_off',
    'rejected'
);

-- Membership lifecycle
CREATE TYPE member_status AS ENUM ('pending', 'active', 'rejected', 'resigned');
";

const CHART_OF_ACCOUNTS_SQL: &str = r"
CREATE TABLE chart_of_accounts (
    id UUID PRIMARY KEY,
    account_number VARCHAR(32) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    parent_id UUID REFERENCES chart_of_accounts(id),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_coa_parent ON chart_of_accounts(parent_id);
";

const JOURNAL_HEADERS_SQL: &str = r"
CREATE TABLE journal_headers (
    id UUID PRIMARY KEY,
    entry_date TIMESTAMPTZ NOT NULL,
    description TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_journal_headers_entry_date ON journal_headers(entry_date);
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    journal_id UUID NOT NULL REFERENCES journal_headers(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES chart_of_accounts(id),
    debit NUMERIC(18,2) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit NUMERIC(18,2) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_journal_lines_journal ON journal_lines(journal_id);
CREATE INDEX idx_journal_lines_account ON journal_lines(account_id);
";

const MEMBERS_SQL: &str = r"
CREATE TABLE members (
    id UUID PRIMARY KEY,
    cooperative_number VARCHAR(32) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(32),
    status member_status NOT NULL DEFAULT 'pending',
    joined_at DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_members_status ON members(status);
";

const SAVING_TYPES_SQL: &str = r"
CREATE TABLE saving_types (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE,
    kind saving_type_kind NOT NULL DEFAULT 'deposit',
    account_id UUID REFERENCES chart_of_accounts(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const SAVINGS_SQL: &str = r"
CREATE TABLE savings (
    id UUID PRIMARY KEY,
    member_id UUID NOT NULL REFERENCES members(id) ON DELETE CASCADE,
    saving_type_id UUID NOT NULL REFERENCES saving_types(id),
    amount NUMERIC(18,2) NOT NULL CHECK (amount > 0),
    date DATE NOT NULL,
    status saving_status NOT NULL DEFAULT 'pending',
    description TEXT,
    journal_id UUID REFERENCES journal_headers(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_savings_member ON savings(member_id);
CREATE INDEX idx_savings_type ON savings(saving_type_id);
CREATE INDEX idx_savings_status ON savings(status);
CREATE INDEX idx_savings_date ON savings(date);
";

const LOAN_TYPES_SQL: &str = r"
CREATE TABLE loan_types (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE,
    monthly_interest_rate NUMERIC(8,4) NOT NULL DEFAULT 0 CHECK (monthly_interest_rate >= 0),
    account_id UUID REFERENCES chart_of_accounts(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const LOANS_SQL: &str = r"
CREATE TABLE loans (
    id UUID PRIMARY KEY,
    member_id UUID NOT NULL REFERENCES members(id) ON DELETE CASCADE,
    loan_type_id UUID NOT NULL REFERENCES loan_types(id),
    amount NUMERIC(18,2) NOT NULL CHECK (amount > 0),
    tenor_months INTEGER NOT NULL CHECK (tenor_months > 0),
    purpose TEXT,
    status loan_status NOT NULL DEFAULT 'pending',
    journal_id UUID REFERENCES journal_headers(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_loans_member ON loans(member_id);
CREATE INDEX idx_loans_status ON loans(status);
";

const LOAN_INSTALLMENTS_SQL: &str = r"
CREATE TABLE loan_installments (
    id UUID PRIMARY KEY,
    loan_id UUID NOT NULL REFERENCES loans(id) ON DELETE CASCADE,
    installment_number INTEGER NOT NULL CHECK (installment_number > 0),
    due_date DATE NOT NULL,
    principal NUMERIC(18,2) NOT NULL,
    interest NUMERIC(18,2) NOT NULL,
    total NUMERIC(18,2) NOT NULL,
    paid_at DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (loan_id, installment_number)
);

CREATE INDEX idx_loan_installments_loan ON loan_installments(loan_id);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    price NUMERIC(18,2) NOT NULL CHECK (price >= 0),
    stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    description TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const SALES_SQL: &str = r"
CREATE TABLE sales (
    id UUID PRIMARY KEY,
    product_id UUID NOT NULL REFERENCES products(id),
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    unit_price NUMERIC(18,2) NOT NULL,
    total NUMERIC(18,2) NOT NULL,
    journal_id UUID REFERENCES journal_headers(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_sales_product ON sales(product_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS sales CASCADE;
DROP TABLE IF EXISTS products CASCADE;
DROP TABLE IF EXISTS loan_installments CASCADE;
DROP TABLE IF EXISTS loans CASCADE;
DROP TABLE IF EXISTS loan_types CASCADE;
DROP TABLE IF EXISTS savings CASCADE;
DROP TABLE IF EXISTS saving_types CASCADE;
DROP TABLE IF EXISTS members CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_headers CASCADE;
DROP TABLE IF EXISTS chart_of_accounts CASCADE;
DROP TYPE IF EXISTS member_status;
DROP TYPE IF EXISTS loan_status;
DROP TYPE IF EXISTS saving_type_kind;
DROP TYPE IF EXISTS saving_status;
DROP TYPE IF EXISTS account_type;
";
