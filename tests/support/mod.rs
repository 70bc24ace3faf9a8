pub mod mock_processor;
