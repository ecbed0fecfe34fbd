// src/services/contract_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CollectionKey, RecordStore},
    models::contract::{Contract, ContractPayload},
};

#[derive(Clone)]
pub struct ContractService {
    store: RecordStore,
}

impl ContractService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub async fn list_contracts(&self) -> Result<Vec<Contract>, AppError> {
        self.store.load_records(CollectionKey::Contracts).await
    }

    pub async fn get_contract(&self, contract_id: &str) -> Result<Contract, AppError> {
        self.list_contracts()
            .await?
            .into_iter()
            .find(|c| c.id == contract_id)
            .ok_or_else(|| AppError::not_found("Contract", contract_id))
    }

    pub async fn create_contract(&self, payload: ContractPayload) -> Result<Contract, AppError> {
        let _writes = self.store.write_lock().await;
        let mut contracts = self.list_contracts().await?;
        let contract = payload.into_contract(Uuid::new_v4().to_string());
        contracts.push(contract.clone());
        self.store.save_records(CollectionKey::Contracts, &contracts).await?;

        tracing::info!(contract_id = %contract.id, name = %contract.name, "contract created");
        Ok(contract)
    }

    /// Work logs already carry their own copy of name and rate, so nothing else changes.
    pub async fn delete_contract(&self, contract_id: &str) -> Result<(), AppError> {
        let _writes = self.store.write_lock().await;
        let mut contracts = self.list_contracts().await?;
        let before = contracts.len();
        contracts.retain(|c| c.id != contract_id);
        if contracts.len() == before {
            return Err(AppError::not_found("Contract", contract_id));
        }
        self.store.save_records(CollectionKey::Contracts, &contracts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRepository;
    use rust_decimal::dec;
    use std::sync::Arc;

    #[tokio::test]
    async fn create_list_delete() {
        let service = ContractService::new(RecordStore::new(Arc::new(MemoryRepository::new())));
        let contract = service
            .create_contract(ContractPayload {
                name: " Tiling ".into(),
                rate: dec!(3.5),
                unit: "m2".into(),
            })
            .await
            .unwrap();

        assert_eq!(contract.name, "Tiling");
        assert_eq!(service.get_contract(&contract.id).await.unwrap(), contract);

        service.delete_contract(&contract.id).await.unwrap();
        assert!(service.list_contracts().await.unwrap().is_empty());
        assert!(matches!(
            service.delete_contract(&contract.id).await,
            Err(AppError::NotFound { entity: "Contract", .. })
        ));
    }
}
