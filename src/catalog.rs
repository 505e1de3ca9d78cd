//! # Reference Gene Catalogs
//!
//! Fixed lookup tables of valid Ensembl gene identifiers, one per supported
//! organism. A catalog is loaded once per process, is immutable afterwards,
//! and is shared read-only across every validation run; membership lookup is
//! a `HashSet` probe so checking tens of thousands of identifiers per file
//! stays cheap.
//!
//! The authoritative catalogs are versioned externally. The crate embeds a
//! snapshot (`data/*.csv`) so the validator works out of the box; a newer
//! snapshot can be supplied as a directory of CSV files with the same layout
//! (header column `ENSEMBL_gene`).

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Header column holding the Ensembl identifier in catalog CSV files
pub const CATALOG_ID_COLUMN: &str = "ENSEMBL_gene";

static BUNDLED: OnceLock<ReferenceCatalogs> = OnceLock::new();

/// Errors raised when a reference catalog cannot be provided
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Backing catalog file could not be located or opened
    #[error("catalog for {organism} unavailable at {path}: {source}")]
    Unavailable {
        /// Organism whose catalog was requested
        organism: Organism,
        /// Path that was probed
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Catalog file exists but is not parseable CSV
    #[error("catalog CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Catalog file lacks the identifier column
    #[error("catalog file {path} is missing the '{column}' column")]
    MissingColumn {
        /// File that was parsed
        path: String,
        /// Expected header column
        column: &'static str,
    },
}

/// Organisms the upload schema recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Organism {
    /// Homo sapiens (NCBITaxon:9606)
    HomoSapiens,
    /// Mus musculus (NCBITaxon:10090)
    MusMusculus,
}

impl Organism {
    /// All supported organisms, in catalog order.
    pub const ALL: [Organism; 2] = [Organism::HomoSapiens, Organism::MusMusculus];

    /// Parse an organism from its declared name.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace;
    /// anything else is unsupported.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "homo sapiens" => Some(Organism::HomoSapiens),
            "mus musculus" => Some(Organism::MusMusculus),
            _ => None,
        }
    }

    /// Canonical organism name.
    pub fn name(&self) -> &'static str {
        match self {
            Organism::HomoSapiens => "Homo sapiens",
            Organism::MusMusculus => "Mus musculus",
        }
    }

    /// NCBI taxonomy ontology identifier.
    pub fn ontology_id(&self) -> &'static str {
        match self {
            Organism::HomoSapiens => "NCBITaxon:9606",
            Organism::MusMusculus => "NCBITaxon:10090",
        }
    }

    /// Ensembl gene identifier prefix for this organism.
    pub fn gene_prefix(&self) -> &'static str {
        match self {
            Organism::HomoSapiens => "ENSG",
            Organism::MusMusculus => "ENSMUSG",
        }
    }

    /// File name of this organism's catalog inside a catalog directory.
    pub fn catalog_file(&self) -> &'static str {
        match self {
            Organism::HomoSapiens => "homo_sapiens.csv",
            Organism::MusMusculus => "mus_musculus.csv",
        }
    }
}

impl fmt::Display for Organism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of known-valid gene identifiers for one organism
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    organism: Organism,
    ids: HashSet<String>,
}

impl ReferenceCatalog {
    /// Build a catalog from an explicit identifier collection.
    pub fn from_ids<I>(organism: Organism, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            organism,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a catalog from CSV with an `ENSEMBL_gene` header column.
    pub fn from_csv_reader<R: Read>(
        organism: Organism,
        reader: R,
        origin: &str,
    ) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

        let id_index = csv_reader
            .headers()?
            .iter()
            .position(|h| h == CATALOG_ID_COLUMN)
            .ok_or(CatalogError::MissingColumn {
                path: origin.to_string(),
                column: CATALOG_ID_COLUMN,
            })?;

        let mut ids = HashSet::new();
        for record in csv_reader.records() {
            let record = record?;
            if let Some(id) = record.get(id_index) {
                let id = id.trim();
                if !id.is_empty() {
                    ids.insert(id.to_string());
                }
            }
        }

        Ok(Self { organism, ids })
    }

    /// Organism this catalog describes.
    pub fn organism(&self) -> Organism {
        self.organism
    }

    /// O(1) membership test for an (unversioned) Ensembl identifier.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Iterate the identifiers in the catalog (unspecified order).
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Number of identifiers in the catalog.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when the catalog holds no identifiers.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Full catalog mapping, one [`ReferenceCatalog`] per supported organism
#[derive(Debug, Clone)]
pub struct ReferenceCatalogs {
    human: ReferenceCatalog,
    mouse: ReferenceCatalog,
}

impl ReferenceCatalogs {
    /// Build from explicit per-organism catalogs.
    pub fn new(human: ReferenceCatalog, mouse: ReferenceCatalog) -> Self {
        Self { human, mouse }
    }

    /// Load catalogs from a directory of CSV files.
    ///
    /// The directory must hold `homo_sapiens.csv` and `mus_musculus.csv`;
    /// a missing or unopenable file is a fatal [`CatalogError::Unavailable`].
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        Ok(Self {
            human: Self::load_one(dir, Organism::HomoSapiens)?,
            mouse: Self::load_one(dir, Organism::MusMusculus)?,
        })
    }

    fn load_one(dir: &Path, organism: Organism) -> Result<ReferenceCatalog, CatalogError> {
        let path = dir.join(organism.catalog_file());
        let file = File::open(&path).map_err(|source| CatalogError::Unavailable {
            organism,
            path: path.clone(),
            source,
        })?;
        ReferenceCatalog::from_csv_reader(organism, file, &path.display().to_string())
    }

    /// Embedded catalog snapshot, loaded once per process.
    pub fn bundled() -> Result<&'static Self, CatalogError> {
        if let Some(catalogs) = BUNDLED.get() {
            return Ok(catalogs);
        }

        let human = ReferenceCatalog::from_csv_reader(
            Organism::HomoSapiens,
            include_str!("../data/homo_sapiens.csv").as_bytes(),
            "data/homo_sapiens.csv",
        )?;
        let mouse = ReferenceCatalog::from_csv_reader(
            Organism::MusMusculus,
            include_str!("../data/mus_musculus.csv").as_bytes(),
            "data/mus_musculus.csv",
        )?;

        Ok(BUNDLED.get_or_init(|| Self { human, mouse }))
    }

    /// Catalog for one organism.
    pub fn get(&self, organism: Organism) -> &ReferenceCatalog {
        match organism {
            Organism::HomoSapiens => &self.human,
            Organism::MusMusculus => &self.mouse,
        }
    }
}
