pub mod blob;
pub mod catalogue;

use std::sync::Arc;

use anyhow::{Context, bail};
use common::catalogue::CatalogueStore;
use common::catalogue::memory::MemoryCatalogueStore;
use common::storage::filesystem::FilesystemBlobStore;
use common::storage::memory::MemoryBlobStore;
use common::storage::{BlobStore, HashEngine};
use sea_orm::DatabaseConnection;
use tracing::info;

pub use blob::SeaOrmBlobStore;
pub use catalogue::SeaOrmCatalogueStore;

use crate::config::{BlobBackend, CatalogueBackend, StorageConfig};
use crate::manager::StoreContext;

/// Build the configured store handles.
///
/// `db` must be present when either backend is `database`.
pub async fn build_context(
    config: &StorageConfig,
    db: Option<&DatabaseConnection>,
) -> anyhow::Result<StoreContext> {
    let catalogue: Arc<dyn CatalogueStore> = match config.catalogue_backend {
        CatalogueBackend::Database => match db {
            Some(db) => Arc::new(SeaOrmCatalogueStore::new(db.clone())),
            None => bail!("catalogue backend 'database' requires a database connection"),
        },
        CatalogueBackend::Memory => Arc::new(MemoryCatalogueStore::new()),
    };

    let blobs: Arc<dyn BlobStore> = match config.blob.backend {
        BlobBackend::Database => match db {
            Some(db) => Arc::new(SeaOrmBlobStore::from_config(db.clone(), &config.blob)),
            None => bail!("blob backend 'database' requires a database connection"),
        },
        BlobBackend::Filesystem => Arc::new(
            FilesystemBlobStore::from_config(&config.blob)
                .await
                .with_context(|| {
                    format!(
                        "Failed to open blob directory {}",
                        config.blob.filesystem_root.display()
                    )
                })?,
        ),
        BlobBackend::Memory => Arc::new(MemoryBlobStore::from_config(&config.blob)),
    };

    info!(
        catalogue = ?config.catalogue_backend,
        blobs = ?config.blob.backend,
        digest = %config.digest_algorithm,
        chunk_size = config.blob.chunk_size,
        "Stores initialized"
    );

    Ok(StoreContext {
        catalogue,
        blobs,
        hasher: HashEngine::new(config.digest_algorithm),
    })
}
