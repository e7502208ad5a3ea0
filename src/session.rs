//! Session execution: one pass over every template on one connection.

use tracing::{debug, warn};
use workload_core::{ConnectionProvider, ExecutionError, GeneratedValue, SessionConnection, Template};
use workload_generator::{ConstructionError, Generator, GeneratorFactory, WorkloadRng};

use crate::binding::{bind, BoundStatement, StatementKind};

/// A template parameter could not be built into a generator.
#[derive(Debug, thiserror::Error)]
#[error("template {template} parameter {param}: {source}")]
pub struct TemplateError {
    pub template: usize,
    pub param: usize,
    #[source]
    pub source: ConstructionError,
}

/// A template with its parameter generators built.
#[derive(Debug)]
pub struct CompiledTemplate {
    index: usize,
    sql: String,
    kind: StatementKind,
    generators: Vec<Box<dyn Generator>>,
}

impl CompiledTemplate {
    /// Build every parameter generator of `template`.
    pub fn compile(
        index: usize,
        template: &Template,
        factory: &GeneratorFactory,
    ) -> Result<Self, TemplateError> {
        let generators = template
            .params
            .iter()
            .enumerate()
            .map(|(param, spec)| {
                factory.build(spec).map_err(|source| TemplateError {
                    template: index,
                    param,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            index,
            sql: template.sql.clone(),
            kind: StatementKind::classify(&template.sql),
            generators,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Generate one value per parameter, in order.
    pub fn generate(&self, rng: &mut WorkloadRng) -> Vec<GeneratedValue> {
        self.generators.iter().map(|g| g.generate(rng)).collect()
    }

    /// Generate fresh values and bind them.
    ///
    /// On a placeholder mismatch the SQL is forwarded unexpanded so the
    /// driver reports the error.
    pub fn bind(&self, rng: &mut WorkloadRng) -> BoundStatement {
        match bind(&self.sql, self.generate(rng)) {
            Ok(bound) => bound,
            Err(e) => {
                warn!(template = self.index, "Binding mismatch, forwarding unexpanded: {e}");
                e.into_unexpanded()
            }
        }
    }
}

/// Build every template, in order. The first failure is returned.
pub fn compile_templates(
    templates: &[Template],
    factory: &GeneratorFactory,
) -> Result<Vec<CompiledTemplate>, TemplateError> {
    templates
        .iter()
        .enumerate()
        .map(|(index, template)| CompiledTemplate::compile(index, template, factory))
        .collect()
}

/// Outcome of a successful session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Statements executed
    pub statements: usize,
    /// Rows drained from reads
    pub rows_read: u64,
    /// Rows affected by writes
    pub rows_affected: u64,
    /// Whether a transaction was committed
    pub committed: bool,
}

/// A session stopped early.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Acquire(#[source] ExecutionError),

    #[error("{0}")]
    Begin(#[source] ExecutionError),

    /// A template failed; the remaining ones were skipped
    #[error("template {template}: {source}")]
    Statement {
        template: usize,
        /// Statements that completed before the failure
        completed: usize,
        /// Whether the transaction was rolled back
        rolled_back: bool,
        #[source]
        source: ExecutionError,
    },

    /// Every statement succeeded but the commit did not
    #[error("{0}")]
    Commit(#[source] ExecutionError),
}

/// Runs sessions over a fixed list of compiled templates.
#[derive(Debug)]
pub struct SessionExecutor {
    templates: Vec<CompiledTemplate>,
    use_transaction: bool,
}

impl SessionExecutor {
    pub fn new(templates: Vec<CompiledTemplate>, use_transaction: bool) -> Self {
        Self {
            templates,
            use_transaction,
        }
    }

    pub fn templates(&self) -> &[CompiledTemplate] {
        &self.templates
    }

    pub fn use_transaction(&self) -> bool {
        self.use_transaction
    }

    /// Run one session: acquire a connection, execute every template in
    /// order, and release the connection on every exit path.
    pub async fn run_session<P: ConnectionProvider>(
        &self,
        provider: &P,
        rng: &mut WorkloadRng,
    ) -> Result<SessionReport, SessionError> {
        let mut conn = provider.acquire().await.map_err(SessionError::Acquire)?;
        let result = self.run_on(&mut conn, rng).await;
        conn.release().await;
        result
    }

    async fn run_on<C: SessionConnection>(
        &self,
        conn: &mut C,
        rng: &mut WorkloadRng,
    ) -> Result<SessionReport, SessionError> {
        if self.use_transaction {
            conn.begin().await.map_err(SessionError::Begin)?;
        }

        let mut report = SessionReport::default();
        for template in &self.templates {
            let statement = template.bind(rng);
            let result = match template.kind() {
                StatementKind::Read => conn
                    .query_drain(&statement.sql, statement.args)
                    .await
                    .map(|rows| report.rows_read += rows),
                StatementKind::Write => conn
                    .execute(&statement.sql, statement.args)
                    .await
                    .map(|rows| report.rows_affected += rows),
            };

            if let Err(source) = result {
                let rolled_back = self.use_transaction && rollback(conn).await;
                return Err(SessionError::Statement {
                    template: template.index(),
                    completed: report.statements,
                    rolled_back,
                    source,
                });
            }
            report.statements += 1;
        }

        if self.use_transaction {
            conn.commit().await.map_err(SessionError::Commit)?;
            report.committed = true;
        }

        debug!(
            statements = report.statements,
            rows_read = report.rows_read,
            rows_affected = report.rows_affected,
            "Session completed"
        );
        Ok(report)
    }
}

async fn rollback<C: SessionConnection>(conn: &mut C) -> bool {
    match conn.rollback().await {
        Ok(()) => true,
        Err(e) => {
            warn!("{e}");
            false
        }
    }
}
