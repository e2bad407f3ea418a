use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_master_data_tables::Migration),
            Box::new(m20240101_000002_create_purchase_tables::Migration),
            Box::new(m20240101_000003_create_stock_ledger_tables::Migration),
            Box::new(m20240101_000004_create_cleaning_tables::Migration),
            Box::new(m20240101_000005_create_processing_tables::Migration),
            Box::new(m20240101_000006_create_quality_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_master_data_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_master_data_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Warehouses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Warehouses::Name).string().not_null())
                        .col(ColumnDef::new(Warehouses::Location).string().not_null())
                        .col(ColumnDef::new(Warehouses::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Warehouses::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Vendors::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vendors::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Vendors::VendorCode)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Vendors::Name).string().not_null())
                        .col(ColumnDef::new(Vendors::Address).string().null())
                        .col(ColumnDef::new(Vendors::ContactName).string().null())
                        .col(ColumnDef::new(Vendors::ContactPhone).string().null())
                        .col(ColumnDef::new(Vendors::ContactEmail).string().null())
                        .col(ColumnDef::new(Vendors::Gstin).string().null())
                        .col(ColumnDef::new(Vendors::BankDetails).string().null())
                        .col(
                            ColumnDef::new(Vendors::Enabled)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Vendors::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(Vendors::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RawMaterialProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RawMaterialProducts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RawMaterialProducts::SkuCode)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(RawMaterialProducts::Name).string().not_null())
                        .col(
                            ColumnDef::new(RawMaterialProducts::Category)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RawMaterialProducts::UnitOfMeasurement)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RawMaterialProducts::MinReorderLevel)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RawMaterialProducts::VendorId).uuid().null())
                        .col(
                            ColumnDef::new(RawMaterialProducts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RawMaterialProducts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(IdSequences::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(IdSequences::Name)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(IdSequences::Value).big_integer().not_null())
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(IdSequences::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RawMaterialProducts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(Iden)]
    enum Warehouses {
        Table,
        Id,
        Name,
        Location,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Vendors {
        Table,
        Id,
        VendorCode,
        Name,
        Address,
        ContactName,
        ContactPhone,
        ContactEmail,
        Gstin,
        BankDetails,
        Enabled,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum RawMaterialProducts {
        Table,
        Id,
        SkuCode,
        Name,
        Category,
        UnitOfMeasurement,
        MinReorderLevel,
        VendorId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum IdSequences {
        Table,
        Name,
        Value,
    }
}

mod m20240101_000002_create_purchase_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_purchase_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::PoNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::VendorId).uuid().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::OrderDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::ExpectedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::PurchaseOrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::RawMaterialId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::QuantityOrdered)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::QuantityReceived)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::Rate)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::Status)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_po_items_order")
                        .table(PurchaseOrderItems::Table)
                        .col(PurchaseOrderItems::PurchaseOrderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(Iden)]
    enum PurchaseOrders {
        Table,
        Id,
        PoNumber,
        VendorId,
        OrderDate,
        ExpectedDate,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum PurchaseOrderItems {
        Table,
        Id,
        PurchaseOrderId,
        RawMaterialId,
        QuantityOrdered,
        QuantityReceived,
        Rate,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_stock_ledger_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_stock_ledger_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockEntries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockEntries::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockEntries::RawMaterialId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockEntries::WarehouseId).uuid().not_null())
                        .col(ColumnDef::new(StockEntries::BatchNumber).string().null())
                        .col(ColumnDef::new(StockEntries::ExpiryDate).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(StockEntries::Quantity).decimal().not_null())
                        .col(ColumnDef::new(StockEntries::EntryType).string().not_null())
                        .col(ColumnDef::new(StockEntries::ReferenceId).uuid().null())
                        .col(ColumnDef::new(StockEntries::Status).string().not_null())
                        .col(ColumnDef::new(StockEntries::ReasonCode).string().null())
                        .col(
                            ColumnDef::new(StockEntries::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_entries_key")
                        .table(StockEntries::Table)
                        .col(StockEntries::RawMaterialId)
                        .col(StockEntries::WarehouseId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_entries_reference")
                        .table(StockEntries::Table)
                        .col(StockEntries::ReferenceId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CurrentStocks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CurrentStocks::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CurrentStocks::RawMaterialId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CurrentStocks::WarehouseId).uuid().not_null())
                        .col(
                            ColumnDef::new(CurrentStocks::CurrentQuantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CurrentStocks::LastUpdated)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One balance row per (material, warehouse); the atomic upsert
            // depends on this constraint.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_current_stocks_key")
                        .table(CurrentStocks::Table)
                        .col(CurrentStocks::RawMaterialId)
                        .col(CurrentStocks::WarehouseId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CurrentStocks::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockEntries::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(Iden)]
    enum StockEntries {
        Table,
        Id,
        RawMaterialId,
        WarehouseId,
        BatchNumber,
        ExpiryDate,
        Quantity,
        EntryType,
        ReferenceId,
        Status,
        ReasonCode,
        CreatedAt,
    }

    #[derive(Iden)]
    enum CurrentStocks {
        Table,
        Id,
        RawMaterialId,
        WarehouseId,
        CurrentQuantity,
        LastUpdated,
    }
}

mod m20240101_000004_create_cleaning_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_cleaning_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CleaningJobs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CleaningJobs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CleaningJobs::JobNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(CleaningJobs::RawMaterialId).uuid().not_null())
                        .col(
                            ColumnDef::new(CleaningJobs::FromWarehouseId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CleaningJobs::ToWarehouseId).uuid().not_null())
                        .col(ColumnDef::new(CleaningJobs::Quantity).decimal().not_null())
                        .col(ColumnDef::new(CleaningJobs::Status).string().not_null())
                        .col(ColumnDef::new(CleaningJobs::StartedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(CleaningJobs::FinishedAt).timestamp_with_time_zone().null())
                        .col(ColumnDef::new(CleaningJobs::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(ColumnDef::new(CleaningJobs::UpdatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CleaningLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CleaningLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CleaningLogs::CleaningJobId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CleaningLogs::Message).string().not_null())
                        .col(ColumnDef::new(CleaningLogs::LoggedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UnfinishedStocks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UnfinishedStocks::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UnfinishedStocks::CleaningJobId).uuid().null())
                        .col(
                            ColumnDef::new(UnfinishedStocks::ProcessingJobId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(UnfinishedStocks::SkuCode).string().not_null())
                        .col(
                            ColumnDef::new(UnfinishedStocks::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UnfinishedStocks::ReasonCode).string().null())
                        .col(
                            ColumnDef::new(UnfinishedStocks::WarehouseId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UnfinishedStocks::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_unfinished_stocks_cleaning_job")
                        .table(UnfinishedStocks::Table)
                        .col(UnfinishedStocks::CleaningJobId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UnfinishedStocks::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CleaningLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CleaningJobs::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(Iden)]
    enum CleaningJobs {
        Table,
        Id,
        JobNumber,
        RawMaterialId,
        FromWarehouseId,
        ToWarehouseId,
        Quantity,
        Status,
        StartedAt,
        FinishedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum CleaningLogs {
        Table,
        Id,
        CleaningJobId,
        Message,
        LoggedAt,
    }

    #[derive(Iden)]
    enum UnfinishedStocks {
        Table,
        Id,
        CleaningJobId,
        ProcessingJobId,
        SkuCode,
        Quantity,
        ReasonCode,
        WarehouseId,
        CreatedAt,
    }
}

mod m20240101_000005_create_processing_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_processing_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProcessingJobs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProcessingJobs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProcessingJobs::JobNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(ProcessingJobs::InputRawMaterialId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProcessingJobs::SourceWarehouseId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProcessingJobs::QuantityInput)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProcessingJobs::Status).string().not_null())
                        .col(
                            ColumnDef::new(ProcessingJobs::StartedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProcessingJobs::FinishedAt).timestamp_with_time_zone().null())
                        .col(
                            ColumnDef::new(ProcessingJobs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProcessingJobs::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ByProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ByProducts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ByProducts::ProcessingJobId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ByProducts::SkuCode).string().not_null())
                        .col(ColumnDef::new(ByProducts::Quantity).decimal().not_null())
                        .col(ColumnDef::new(ByProducts::WarehouseId).uuid().not_null())
                        .col(ColumnDef::new(ByProducts::Tag).string().null())
                        .col(ColumnDef::new(ByProducts::Reason).string().null())
                        .col(ColumnDef::new(ByProducts::CreatedAt).timestamp_with_time_zone().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_by_products_job")
                        .table(ByProducts::Table)
                        .col(ByProducts::ProcessingJobId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(FinishedGoods::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FinishedGoods::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FinishedGoods::ProcessingJobId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(FinishedGoods::SkuCode).string().not_null())
                        .col(ColumnDef::new(FinishedGoods::Name).string().not_null())
                        .col(ColumnDef::new(FinishedGoods::Category).string().not_null())
                        .col(
                            ColumnDef::new(FinishedGoods::UnitOfMeasurement)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FinishedGoods::Quantity).decimal().not_null())
                        .col(ColumnDef::new(FinishedGoods::WarehouseId).uuid().not_null())
                        .col(
                            ColumnDef::new(FinishedGoods::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FinishedGoods::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ByProducts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProcessingJobs::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(Iden)]
    enum ProcessingJobs {
        Table,
        Id,
        JobNumber,
        InputRawMaterialId,
        SourceWarehouseId,
        QuantityInput,
        Status,
        StartedAt,
        FinishedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum ByProducts {
        Table,
        Id,
        ProcessingJobId,
        SkuCode,
        Quantity,
        WarehouseId,
        Tag,
        Reason,
        CreatedAt,
    }

    #[derive(Iden)]
    enum FinishedGoods {
        Table,
        Id,
        ProcessingJobId,
        SkuCode,
        Name,
        Category,
        UnitOfMeasurement,
        Quantity,
        WarehouseId,
        CreatedAt,
    }
}

mod m20240101_000006_create_quality_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_quality_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RmQualityReports::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RmQualityReports::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RmQualityReports::RawMaterialName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RmQualityReports::Variety).string().null())
                        .col(ColumnDef::new(RmQualityReports::Supplier).string().null())
                        .col(ColumnDef::new(RmQualityReports::Grn).string().not_null())
                        .col(ColumnDef::new(RmQualityReports::CreatedBy).uuid().null())
                        .col(
                            ColumnDef::new(RmQualityReports::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RmQualityReports::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(RmQualityParameters::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RmQualityParameters::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RmQualityParameters::ReportId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RmQualityParameters::Parameter)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RmQualityParameters::Standard)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RmQualityParameters::Result)
                                .string()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_rm_quality_parameters_report")
                        .table(RmQualityParameters::Table)
                        .col(RmQualityParameters::ReportId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RmQualityParameters::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(RmQualityReports::Table).to_owned())
                .await?;
            Ok(())
        }
    }

    #[derive(Iden)]
    enum RmQualityReports {
        Table,
        Id,
        RawMaterialName,
        Variety,
        Supplier,
        Grn,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum RmQualityParameters {
        Table,
        Id,
        ReportId,
        Parameter,
        Standard,
        Result,
    }
}
