use api_types::{
    Category,
    ledger::{AdviceRequest, AdviceResponse, Aggregate, ExchangeRateResponse},
    transaction::{
        BatchAccepted, FilterQuery, Transaction, TransactionBatch, TransactionType,
        TransactionsResponse,
    },
};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{LedgerError, LedgerResult, RemoteLedger};
use crate::period::PeriodKey;

const PRINCIPAL_HEADER: &str = "x-principal";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`RemoteLedger`] backed by the ledger's JSON-over-HTTP API.
///
/// The principal is sent on every request; an empty principal makes the
/// caller anonymous and every call fails with [`LedgerError::Unauthorized`].
#[derive(Clone, Debug)]
pub struct HttpLedger {
    base_url: Url,
    http: reqwest::Client,
    principal: String,
}

impl HttpLedger {
    pub fn new(base_url: &str, principal: &str) -> LedgerResult<Self> {
        Self::with_client(reqwest::Client::new(), base_url, principal)
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        principal: &str,
    ) -> LedgerResult<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|err| LedgerError::InvalidUrl(err.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url,
            http,
            principal: principal.trim().to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> LedgerResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| LedgerError::InvalidUrl(err.to_string()))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        if self.principal.is_empty() {
            req
        } else {
            req.header(PRINCIPAL_HEADER, &self.principal)
        }
    }

    async fn post_json<TReq: Serialize + ?Sized, TResp: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
    ) -> LedgerResult<TResp> {
        let req = self.http.post(self.endpoint(path)?).json(body);
        let res = self.authorize(req).send().await?;
        Self::decode(res).await
    }

    async fn get_json<TResp: DeserializeOwned>(&self, path: &str) -> LedgerResult<TResp> {
        let req = self.http.get(self.endpoint(path)?);
        let res = self.authorize(req).send().await?;
        Self::decode(res).await
    }

    async fn decode<TResp: DeserializeOwned>(res: Response) -> LedgerResult<TResp> {
        let status = res.status();
        if status.is_success() {
            return Ok(res.json::<TResp>().await?);
        }

        let message = res
            .json::<ErrorBody>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());

        Err(match status.as_u16() {
            401 => LedgerError::Unauthorized,
            400 | 422 => LedgerError::Rejected(message),
            status => LedgerError::Server { status, message },
        })
    }

    async fn aggregate(&self, path: &str, period: PeriodKey) -> LedgerResult<f64> {
        let res: Aggregate = self.post_json(path, &period.to_query()).await?;
        Ok(res.value)
    }

    async fn transactions(&self, path: &str, period: PeriodKey) -> LedgerResult<Vec<Transaction>> {
        let res: TransactionsResponse = self.post_json(path, &period.to_query()).await?;
        Ok(res.transactions)
    }
}

#[async_trait]
impl RemoteLedger for HttpLedger {
    async fn add_transactions(&self, batch: TransactionBatch) -> LedgerResult<BatchAccepted> {
        self.post_json("/transactions", &batch).await
    }

    async fn balance(&self, period: PeriodKey) -> LedgerResult<f64> {
        self.aggregate("/balance", period).await
    }

    async fn income(&self, period: PeriodKey) -> LedgerResult<f64> {
        self.aggregate("/income", period).await
    }

    async fn expense(&self, period: PeriodKey) -> LedgerResult<f64> {
        self.aggregate("/expense", period).await
    }

    async fn report_by_month(&self, period: PeriodKey) -> LedgerResult<Vec<Transaction>> {
        self.transactions("/report", period).await
    }

    async fn income_report(&self, period: PeriodKey) -> LedgerResult<Vec<Transaction>> {
        self.transactions("/report/income", period).await
    }

    async fn expense_report(&self, period: PeriodKey) -> LedgerResult<Vec<Transaction>> {
        self.transactions("/report/expense", period).await
    }

    async fn filtered_transactions(
        &self,
        kind: TransactionType,
        category: Option<Category>,
        period: PeriodKey,
    ) -> LedgerResult<Vec<Transaction>> {
        let query = FilterQuery {
            transaction_type: kind,
            category,
            year_month: period.to_string(),
        };
        let res: TransactionsResponse = self.post_json("/transactions/filter", &query).await?;
        Ok(res.transactions)
    }

    async fn exchange_rate(&self) -> LedgerResult<f64> {
        let res: ExchangeRateResponse = self.get_json("/exchange-rate").await?;
        Ok(res.rate)
    }

    async fn advice(&self, income: &str, expenses: &str, balance: &str) -> LedgerResult<String> {
        let req = AdviceRequest {
            total_income: income.to_string(),
            total_expenses: expenses.to_string(),
            balance: balance.to_string(),
        };
        let res: AdviceResponse = self.post_json("/advice", &req).await?;
        Ok(res.advice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(
            HttpLedger::new("not a url", "alice"),
            Err(LedgerError::InvalidUrl(_))
        ));
    }

    #[test]
    fn endpoints_keep_base_path() {
        let ledger = HttpLedger::new("http://localhost:3000/api", "alice").unwrap();
        assert_eq!(
            ledger.endpoint("/balance").unwrap().as_str(),
            "http://localhost:3000/api/balance"
        );
        assert_eq!(
            ledger.endpoint("report/income").unwrap().as_str(),
            "http://localhost:3000/api/report/income"
        );
    }
}
