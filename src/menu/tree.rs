use super::MenuNode;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// The Rogers support line phone tree, mirrored from the live IVR.
///
/// Prompt wording and digits must match the deployed system exactly; the
/// digits are transmitted verbatim, so verify any change against a real
/// call before updating this table.
pub static SUPPORT_MENU: Lazy<Arc<MenuNode>> = Lazy::new(|| {
    MenuNode::new(
        "Welcome to Rogers. For English, press 1. Pour le français, faites le 2.",
        "",
        vec![
            MenuNode::new(
                "For English, press 1.",
                "1",
                vec![
                    MenuNode::leaf(
                        "Please enter your phone number, then press pound.",
                        "#",
                    ),
                    MenuNode::new(
                        "If new to Rogers, press star.",
                        "*",
                        vec![
                            MenuNode::new(
                                "For billing and payment inquiries, press 1.",
                                "1",
                                vec![
                                    MenuNode::new(
                                        "For your account balance, press 1.",
                                        "1",
                                        vec![MenuNode::leaf(
                                            "To better assist you, please enter your 10-digit telephone number, including the area code, then press pound.",
                                            "#",
                                        )],
                                    ),
                                    MenuNode::new(
                                        "To make a payment, press 2.",
                                        "2",
                                        vec![MenuNode::leaf(
                                            "To better assist you, please enter your 10-digit telephone number, including the area code, then press pound.",
                                            "#",
                                        )],
                                    ),
                                    MenuNode::leaf("For payment arrangements, press 3.", "3"),
                                    MenuNode::leaf("For usage details, press 4.", "4"),
                                    MenuNode::leaf("For more options, press 5.", "5"),
                                ],
                            ),
                            MenuNode::new(
                                "For technical support, press 2.",
                                "2",
                                vec![MenuNode::leaf(
                                    "To better assist you, please enter your 10-digit telephone number, including the area code, then press pound.",
                                    "#",
                                )],
                            ),
                            MenuNode::new(
                                "To add products and services, press 3.",
                                "3",
                                vec![
                                    MenuNode::new(
                                        "For all your mobile needs, including 5G home Internet, press 1.",
                                        "1",
                                        vec![
                                            MenuNode::leaf(
                                                "If you're already a Rogers mobile or 5G home Internet customer, press 1.",
                                                "1",
                                            ),
                                            MenuNode::leaf(
                                                "If you would like to become a new mobile or 5G home Internet customer, press 2.",
                                                "2",
                                            ),
                                            MenuNode::leaf(
                                                "For phone number transfer requests to Rogers, press 3.",
                                                "3",
                                            ),
                                        ],
                                    ),
                                    MenuNode::leaf(
                                        "For all your residential needs, press 2.",
                                        "2",
                                    ),
                                ],
                            ),
                            MenuNode::new(
                                "For account changes, press 4.",
                                "4",
                                vec![
                                    MenuNode::leaf(
                                        "For travel-related inquiries, including roaming, press 1.",
                                        "1",
                                    ),
                                    MenuNode::leaf(
                                        "To report a lost or stolen device, press 2.",
                                        "2",
                                    ),
                                    MenuNode::leaf("For move-related inquiries, press 3.", "3"),
                                    MenuNode::leaf("To change a service, press 4.", "4"),
                                    MenuNode::leaf("To cancel a service, press 5.", "5"),
                                    MenuNode::new(
                                        "To hear more options, press 6.",
                                        "6",
                                        vec![
                                            MenuNode::leaf(
                                                "Most account modifications such as price plan changes or modifying your contact information can be done through Rogers.com. To do so now, hang up and visit www.rogers.com.",
                                                "",
                                            ),
                                            MenuNode::leaf(
                                                "To schedule or modify a temporary suspension of your mobile phone, press 1.",
                                                "1",
                                            ),
                                            MenuNode::leaf(
                                                "To update or change your method of payment, press 2.",
                                                "2",
                                            ),
                                            MenuNode::leaf(
                                                "To create or reset your account PIN, press 3.",
                                                "3",
                                            ),
                                            MenuNode::leaf(
                                                "To purchase new products or services, press 4.",
                                                "4",
                                            ),
                                            MenuNode::leaf(
                                                "To update or change your contact number, email address, or billing address, press 5.",
                                                "5",
                                            ),
                                            MenuNode::leaf(
                                                "For all other account changes, press 6.",
                                                "6",
                                            ),
                                            MenuNode::leaf(
                                                "For more information, visit www.rogers.com.",
                                                "",
                                            ),
                                        ],
                                    ),
                                ],
                            ),
                        ],
                    ),
                ],
            ),
            MenuNode::leaf("Pour le français, faites le 2.", "2"),
        ],
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_offers_the_language_choice_in_order() {
        let root = &*SUPPORT_MENU;
        assert!(root.digit.is_empty());
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].digit, "1");
        assert_eq!(root.children[1].digit, "2");
        assert!(root.children[1].is_leaf());
    }

    #[test]
    fn the_deep_account_changes_branch_is_reachable() {
        let english = &SUPPORT_MENU.children[0];
        let new_customer = &english.children[1];
        assert_eq!(new_customer.digit, "*");
        let account_changes = &new_customer.children[3];
        assert_eq!(account_changes.digit, "4");
        let more_options = &account_changes.children[5];
        assert_eq!(more_options.digit, "6");
        assert_eq!(more_options.children.len(), 8);
        // informational entries carry no digit
        assert!(more_options.children[0].digit.is_empty());
        assert!(more_options.children[7].digit.is_empty());
    }
}
