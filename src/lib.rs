//! # Multi Zopfli Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione del run e flag per zopflipng
//! - `error`: Tipi di errore custom
//! - `file_manager`: Discovery dei PNG via glob e utilità sulle dimensioni
//! - `ledger`: Dimensioni prima/dopo per ogni file
//! - `compressor`: Invocazione di zopflipng su un singolo file
//! - `tool_resolver`: Ricerca dell'eseguibile zopflipng
//! - `optimizer`: Work queue limitata e orchestrazione del run
//! - `reporter`: Totali prima del run e riepilogo finale
//! - `progress`: Progress bar
//! - `json_output`: Eventi JSON per uso programmatico
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use multi_zopfli::{BatchOptimizer, Config};
//!
//! let optimizer = BatchOptimizer::new(Config::default())?;
//! let outcome = optimizer.run("assets/**/*.png").await?;
//! ```

pub mod compressor;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod json_output;
pub mod ledger;
pub mod optimizer;
pub mod progress;
pub mod reporter;
pub mod tool_resolver;

pub use config::{Config, OutputMode, ZopfliFlags};
pub use error::OptimizeError;
pub use ledger::{SizeLedger, SizeRecord};
pub use optimizer::{BatchOptimizer, RunOutcome, WorkQueue};
pub use reporter::RunSummary;

#[cfg(all(test, unix))]
pub(crate) mod test_support {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    /// Write a file that starts with the PNG signature, padded to `len` bytes
    pub fn write_png(dir: &Path, name: &str, len: usize) -> PathBuf {
        let path = dir.join(name);
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.resize(len, 0);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    /// Install an executable shell script under `dir/bin` and return its path
    pub fn install_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let bin = dir.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let path = bin.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Fake zopflipng: truncates the output to 60000 bytes, fails on any
    /// input named `b.png`
    pub fn fake_zopflipng(dir: &Path) -> PathBuf {
        install_script(
            dir,
            "zopflipng",
            r#"for arg in "$@"; do input="$output"; output="$arg"; done
case "$input" in
  *b.png) echo "cannot compress $input" >&2; exit 1 ;;
esac
head -c 60000 "$input" > "$output.part" && mv "$output.part" "$output"
"#,
        )
    }

    /// Fake zopflipng that records overlapping invocations in `dir/overlap`
    /// and every call in `dir/calls`
    pub fn overlap_detecting_zopflipng(dir: &Path) -> PathBuf {
        let lock = dir.join("lock");
        let overlap = dir.join("overlap");
        let calls = dir.join("calls");
        install_script(
            dir,
            "zopflipng",
            &format!(
                r#"if ! mkdir "{lock}" 2>/dev/null; then echo overlap >> "{overlap}"; fi
echo call >> "{calls}"
sleep 0.2
rmdir "{lock}" 2>/dev/null
exit 0
"#,
                lock = lock.display(),
                overlap = overlap.display(),
                calls = calls.display(),
            ),
        )
    }
}
